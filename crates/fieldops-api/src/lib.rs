//! Typed client for the FieldOps dashboard REST API.
//!
//! Wraps the remote `{success, data|error}` envelope endpoints the session
//! layer depends on (login, who-am-i, refresh, logout) plus a generic
//! authenticated request for the resource screens downstream. Every call can
//! be bounded by a per-call timeout; a downstream 401 is announced on the
//! [`AuthEventBus`] instead of through a global callback.

mod client;
mod error;
mod events;

pub mod auth;

pub use client::ApiClient;
pub use error::{ApiError, Result};
pub use events::{AuthEvent, AuthEventBus};
