//! The remember-me credential store.
//!
//! Persists at most one login/password pair as an encrypted JSON record at a
//! fixed path. Every public operation is fail-silent: unsupported crypto,
//! blocked storage, a corrupt record, a foreign-device record, or a wedged
//! disk all degrade to "nothing remembered" and are only logged. Each
//! operation is bounded by the configured storage timeout, so a slow backend
//! can never stall the caller's auth flow.

use std::path::PathBuf;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{Duration as TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use zeroize::Zeroize;

use fieldops_core::config::AuthConfig;
use fieldops_core::{paths, SecretString};

use crate::crypto;
use crate::error::{CredentialError, Result};
use crate::fingerprint;
use crate::types::{CredentialRecord, SavedCredentials};

/// Serialized form of the pair inside the ciphertext.
#[derive(Serialize, Deserialize)]
struct PlainPair {
    login: String,
    password: String,
}

/// Encrypted credential store bound to one record path and one device.
pub struct CredentialStore {
    path: PathBuf,
    fingerprint: String,
    ttl: TimeDelta,
    op_timeout: Duration,
}

impl CredentialStore {
    /// Create a store writing to `path`, with records valid for `ttl_days`.
    pub fn new(path: PathBuf, ttl_days: i64, op_timeout: Duration) -> Self {
        Self {
            path,
            fingerprint: fingerprint::device_fingerprint(),
            ttl: TimeDelta::days(ttl_days),
            op_timeout,
        }
    }

    /// Create a store at the default record path, tuned from config.
    pub fn from_config(auth: &AuthConfig) -> Result<Self> {
        let path = paths::credential_file()
            .map_err(|e| CredentialError::StorageError(e.to_string()))?;
        Ok(Self::new(
            path,
            auth.credential_ttl_days,
            Duration::from_secs(auth.storage_timeout_secs),
        ))
    }

    /// Override the device fingerprint.
    ///
    /// Exists so tests can simulate fingerprint drift; production code always
    /// uses the ambient device fingerprint.
    pub fn with_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.fingerprint = fingerprint.into();
        self
    }

    /// Remember a login/password pair.
    ///
    /// Failures degrade to "credentials not remembered"; nothing propagates.
    pub async fn save(&self, login: &str, password: &str) {
        match tokio::time::timeout(self.op_timeout, self.try_save(login, password)).await {
            Ok(Ok(())) => debug!("credential record written"),
            Ok(Err(e)) => warn!("could not save credentials, continuing without: {e}"),
            Err(_) => warn!("credential save timed out, continuing without"),
        }
    }

    /// Load the remembered pair, if a valid record exists for this device.
    ///
    /// Absent, expired, corrupt, and foreign-device records all read as `None`.
    pub async fn load(&self) -> Option<SavedCredentials> {
        match tokio::time::timeout(self.op_timeout, self.try_load()).await {
            Ok(Ok(found)) => found,
            Ok(Err(e)) => {
                warn!("could not load saved credentials, treating as absent: {e}");
                None
            }
            Err(_) => {
                warn!("credential load timed out, treating as absent");
                None
            }
        }
    }

    /// Forget the remembered pair. Idempotent and fail-silent.
    pub async fn clear(&self) {
        match tokio::time::timeout(self.op_timeout, self.try_clear()).await {
            Ok(Ok(())) => debug!("credential record cleared"),
            Ok(Err(e)) => warn!("could not clear credentials: {e}"),
            Err(_) => warn!("credential clear timed out"),
        }
    }

    /// Whether a currently loadable record exists.
    pub async fn exists(&self) -> bool {
        self.load().await.is_some()
    }

    async fn try_save(&self, login: &str, password: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let perms = std::fs::Permissions::from_mode(0o700);
                tokio::fs::set_permissions(parent, perms).await?;
            }
        }

        let mut pair = serde_json::to_vec(&PlainPair {
            login: login.to_string(),
            password: password.to_string(),
        })?;
        let sealed = crypto::encrypt(&self.fingerprint, &pair);
        pair.zeroize();
        let (ciphertext, nonce, salt) = sealed?;

        let now = Utc::now();
        let record = CredentialRecord {
            ciphertext: BASE64.encode(&ciphertext),
            nonce: BASE64.encode(&nonce),
            salt: hex::encode(&salt),
            expires_at: now + self.ttl,
            created_at: now,
        };

        let json = serde_json::to_string_pretty(&record)?;
        write_record_file(&self.path, json.as_bytes()).await
    }

    async fn try_load(&self) -> Result<Option<SavedCredentials>> {
        let data = match tokio::fs::read_to_string(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let record: CredentialRecord = serde_json::from_str(&data)
            .map_err(|e| CredentialError::MalformedRecord(e.to_string()))?;

        if record.is_expired(Utc::now()) {
            // Left on disk on purpose; expiry is only ever checked on read.
            debug!("credential record expired, treating as absent");
            return Ok(None);
        }

        let ciphertext = BASE64
            .decode(&record.ciphertext)
            .map_err(|e| CredentialError::MalformedRecord(format!("ciphertext: {e}")))?;
        let nonce = BASE64
            .decode(&record.nonce)
            .map_err(|e| CredentialError::MalformedRecord(format!("nonce: {e}")))?;
        let salt = hex::decode(&record.salt)
            .map_err(|e| CredentialError::MalformedRecord(format!("salt: {e}")))?;

        let mut plaintext = crypto::decrypt(&self.fingerprint, &ciphertext, &nonce, &salt)?;
        let parsed: std::result::Result<PlainPair, _> = serde_json::from_slice(&plaintext);
        plaintext.zeroize();
        let pair = parsed.map_err(|e| CredentialError::MalformedRecord(format!("payload: {e}")))?;

        Ok(Some(SavedCredentials {
            login: pair.login,
            password: SecretString::new(pair.password),
        }))
    }

    async fn try_clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Write `data` to `path` with mode 0600 on Unix.
async fn write_record_file(path: &std::path::Path, data: &[u8]) -> Result<()> {
    tokio::fs::write(path, data).await?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        tokio::fs::set_permissions(path, perms).await?;
    }

    Ok(())
}
