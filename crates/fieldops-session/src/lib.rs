//! Session bootstrap, token management, and route guarding for the FieldOps
//! client.
//!
//! Everything auth-related hangs off one [`SessionContext`]: the in-memory
//! token cells with their durable/ephemeral mirror tiers, the persisted
//! session snapshot, the remembered-credential store, the login rate limiter,
//! and the bootstrap state machine. The context is constructed explicitly and
//! passed to whoever needs it; there is no global auth state.
//!
//! The bootstrap sequencer ([`SessionContext::bootstrap`]) runs an ordered
//! recovery chain at most once per process and always reaches a terminal
//! verdict within a hard time bound. [`RouteGuard`] turns that verdict into
//! render/redirect decisions for protected screens.

pub mod bootstrap;
pub mod context;
pub mod error;
pub mod guard;
pub mod rate_limit;
pub mod state;
pub mod state_cache;
pub mod tokens;

pub use bootstrap::BootstrapOptions;
pub use context::{AuthTimeouts, SessionContext};
pub use error::{Result, SessionError};
pub use guard::{GuardDecision, GuardStatus, RouteGuard};
pub use rate_limit::{LoginGate, LoginRateLimiter};
pub use state::AuthState;
pub use state_cache::{SessionSnapshot, StateCache};
pub use tokens::{
    DurableTokenStorage, EphemeralTokenStorage, TokenManager, TokenSlot, TokenStorage,
};
