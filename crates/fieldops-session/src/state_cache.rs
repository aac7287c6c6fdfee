//! Persisted session snapshot.
//!
//! A durable structured record, separate from the credential store, holding
//! the last known-good session: profile, authenticated flag, and a token
//! mirror. The bootstrap chain consults it as the restore step after a
//! failed refresh; it is rewritten wholesale on every successful auth and
//! removed on logout or terminal failure. Like the credential store it is an
//! optimization, so every failure is absorbed into "nothing cached".

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use fieldops_core::config::AuthConfig;
use fieldops_core::{paths, UserProfile};

use crate::error::{Result, SessionError};

/// The cached session as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Profile of the last authenticated user.
    pub user: UserProfile,

    /// Whether the snapshot was taken from an authenticated session.
    pub authenticated: bool,

    /// Access token mirror, if one was live when the snapshot was taken.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// Refresh token mirror, if one was live when the snapshot was taken.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// When the snapshot was written.
    pub saved_at: DateTime<Utc>,
}

/// File-backed store for the [`SessionSnapshot`].
pub struct StateCache {
    path: PathBuf,
    op_timeout: Duration,
}

impl StateCache {
    /// Create a cache writing to `path`.
    pub fn new(path: PathBuf, op_timeout: Duration) -> Self {
        Self { path, op_timeout }
    }

    /// Cache at the default snapshot path, tuned from config.
    pub fn from_config(auth: &AuthConfig) -> Result<Self> {
        let path =
            paths::session_state_file().map_err(|e| SessionError::Storage(e.to_string()))?;
        Ok(Self::new(path, Duration::from_secs(auth.storage_timeout_secs)))
    }

    /// Persist a snapshot. Fail-silent.
    pub async fn save(&self, snapshot: &SessionSnapshot) {
        match tokio::time::timeout(self.op_timeout, self.try_save(snapshot)).await {
            Ok(Ok(())) => debug!("session snapshot written"),
            Ok(Err(e)) => warn!("could not write session snapshot: {e}"),
            Err(_) => warn!("session snapshot write timed out"),
        }
    }

    /// Read the snapshot, if a readable one exists.
    pub async fn load(&self) -> Option<SessionSnapshot> {
        match tokio::time::timeout(self.op_timeout, self.try_load()).await {
            Ok(Ok(found)) => found,
            Ok(Err(e)) => {
                warn!("could not read session snapshot, treating as absent: {e}");
                None
            }
            Err(_) => {
                warn!("session snapshot read timed out, treating as absent");
                None
            }
        }
    }

    /// Remove the snapshot. Idempotent and fail-silent.
    pub async fn clear(&self) {
        match tokio::time::timeout(self.op_timeout, self.try_clear()).await {
            Ok(Ok(())) => debug!("session snapshot cleared"),
            Ok(Err(e)) => warn!("could not clear session snapshot: {e}"),
            Err(_) => warn!("session snapshot clear timed out"),
        }
    }

    async fn try_save(&self, snapshot: &SessionSnapshot) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| SessionError::Storage(e.to_string()))?;
        }

        let json = serde_json::to_string_pretty(snapshot)
            .map_err(|e| SessionError::Storage(e.to_string()))?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| SessionError::Storage(e.to_string()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            tokio::fs::set_permissions(&self.path, perms)
                .await
                .map_err(|e| SessionError::Storage(e.to_string()))?;
        }

        Ok(())
    }

    async fn try_load(&self) -> Result<Option<SessionSnapshot>> {
        let data = match tokio::fs::read_to_string(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SessionError::Storage(e.to_string())),
        };

        let snapshot =
            serde_json::from_str(&data).map_err(|e| SessionError::Storage(e.to_string()))?;
        Ok(Some(snapshot))
    }

    async fn try_clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SessionError::Storage(e.to_string())),
        }
    }
}
