//! Error types for credential storage.
//!
//! These never cross the crate boundary during normal operation: the public
//! store API absorbs them into "nothing remembered". They exist so the
//! internal operations can report what went wrong to the log.

use thiserror::Error;

/// Errors that can occur inside credential store operations.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Storage operation timed out")]
    Timeout,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience result alias for credential operations.
pub type Result<T> = std::result::Result<T, CredentialError>;
