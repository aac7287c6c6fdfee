//! Credential record types.

use chrono::{DateTime, Utc};
use fieldops_core::SecretString;
use serde::{Deserialize, Serialize};

/// The encrypted credential record as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialRecord {
    /// AES-256-GCM ciphertext of the serialized login/password pair, base64.
    pub ciphertext: String,

    /// Per-record nonce, base64.
    pub nonce: String,

    /// Per-record KDF salt, hex.
    pub salt: String,

    /// Absolute expiry. The record is treated as absent once passed; it is
    /// never proactively deleted.
    pub expires_at: DateTime<Utc>,

    /// When the record was written.
    pub created_at: DateTime<Utc>,
}

impl CredentialRecord {
    /// Whether the record has outlived its expiry.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// A decrypted login/password pair handed back to the auto-login path.
///
/// The password rides in a [`SecretString`], so accidental `Debug` output
/// shows `[REDACTED]` and the plaintext is zeroed on drop.
#[derive(Debug, Clone)]
pub struct SavedCredentials {
    /// Login the pair was saved under.
    pub login: String,

    /// The matching password.
    pub password: SecretString,
}
