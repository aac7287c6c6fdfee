//! Error types for API operations.

use std::time::Duration;
use thiserror::Error;

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server rejected the request's credentials (HTTP 401).
    #[error("Not authenticated")]
    Unauthorized,

    /// The login endpoint rejected the submitted pair.
    #[error("Invalid login or password")]
    InvalidCredentials,

    /// The per-call timer fired before the server answered.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Transport-level failure.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-401 HTTP failure.
    #[error("Server error: {status} - {message}")]
    Server { status: u16, message: String },

    /// HTTP success whose envelope reported failure.
    #[error("API error: {0}")]
    Api(String),

    /// Response did not match the envelope contract.
    #[error("Malformed response: {0}")]
    Envelope(String),

    /// Client-side configuration problem.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Whether the server explicitly said "not authenticated".
    ///
    /// The bootstrap chain branches on this: an explicit rejection goes down
    /// the refresh/restore path, anything else down the auto-login path.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized | Self::InvalidCredentials)
    }

    /// Create a server error.
    pub fn server_error(status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
        }
    }

    /// Create an envelope-contract error.
    pub fn envelope(message: impl Into<String>) -> Self {
        Self::Envelope(message.into())
    }
}
