//! Encrypted remember-me credential storage for the FieldOps client.
//!
//! Persists at most one login/password pair, sealed with AES-256-GCM under
//! a key derived from the device fingerprint. Records self-expire and can
//! only be opened on the device that wrote them.

pub mod crypto;
pub mod error;
pub mod fingerprint;
pub mod store;
pub mod types;

pub use error::{CredentialError, Result};
pub use store::CredentialStore;
pub use types::{CredentialRecord, SavedCredentials};
