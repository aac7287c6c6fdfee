//! Error types for session operations.

use std::time::Duration;
use thiserror::Error;

/// Convenience result alias for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors surfaced by the session layer.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The server rejected the submitted login/password pair.
    #[error("Invalid login or password")]
    InvalidCredentials,

    /// The client-side limiter is blocking further login attempts.
    #[error("Too many failed attempts; try again in {}s", retry_in.as_secs())]
    TooManyAttempts { retry_in: Duration },

    /// A remote call failed for a non-auth reason.
    #[error("API error: {0}")]
    Api(#[from] fieldops_api::ApiError),

    /// A local persistence operation failed.
    #[error("Storage error: {0}")]
    Storage(String),
}
