//! Session token management across two persistence tiers.
//!
//! The in-memory cells are the source of truth and are updated synchronously,
//! so in-flight logic always sees a freshly set token. Each token is mirrored
//! into exactly one persistence tier chosen by the remember flag: the durable
//! tier (a file that survives restarts) or the ephemeral tier (dropped with
//! the process). Setting a token also removes it from the other tier, so at
//! most one tier ever holds a live copy. Mirror failures are logged and
//! absorbed; memory stays authoritative.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use fieldops_core::config::AuthConfig;
use fieldops_core::{paths, SecretString};

use crate::error::{Result, SessionError};

/// Which token a storage operation addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenSlot {
    Access,
    Refresh,
}

/// A persistence tier for token slots.
#[async_trait]
pub trait TokenStorage: Send + Sync {
    /// Read a slot, `None` when empty.
    async fn get(&self, slot: TokenSlot) -> Result<Option<String>>;

    /// Write a slot.
    async fn put(&self, slot: TokenSlot, value: &str) -> Result<()>;

    /// Empty a slot; emptying an empty slot is not an error.
    async fn remove(&self, slot: TokenSlot) -> Result<()>;
}

/// On-disk layout of the durable tier.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredSlots {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
}

impl StoredSlots {
    fn slot(&self, slot: TokenSlot) -> &Option<String> {
        match slot {
            TokenSlot::Access => &self.access_token,
            TokenSlot::Refresh => &self.refresh_token,
        }
    }

    fn slot_mut(&mut self, slot: TokenSlot) -> &mut Option<String> {
        match slot {
            TokenSlot::Access => &mut self.access_token,
            TokenSlot::Refresh => &mut self.refresh_token,
        }
    }
}

/// File-backed tier that survives restarts (~/.fieldops/state/tokens.json).
pub struct DurableTokenStorage {
    path: PathBuf,
}

impl DurableTokenStorage {
    /// Create a tier backed by `path`.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    async fn read_slots(&self) -> Result<StoredSlots> {
        let data = match tokio::fs::read_to_string(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(StoredSlots::default())
            }
            Err(e) => return Err(SessionError::Storage(e.to_string())),
        };
        serde_json::from_str(&data).map_err(|e| SessionError::Storage(e.to_string()))
    }

    async fn write_slots(&self, slots: &StoredSlots) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| SessionError::Storage(e.to_string()))?;
        }

        let json =
            serde_json::to_string_pretty(slots).map_err(|e| SessionError::Storage(e.to_string()))?;
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
}

#[async_trait]
impl TokenStorage for DurableTokenStorage {
    async fn get(&self, slot: TokenSlot) -> Result<Option<String>> {
        Ok(self.read_slots().await?.slot(slot).clone())
    }

    async fn put(&self, slot: TokenSlot, value: &str) -> Result<()> {
        let mut slots = self.read_slots().await?;
        *slots.slot_mut(slot) = Some(value.to_string());
        self.write_slots(&slots).await
    }

    async fn remove(&self, slot: TokenSlot) -> Result<()> {
        let mut slots = self.read_slots().await?;
        if slots.slot(slot).is_none() {
            return Ok(());
        }
        *slots.slot_mut(slot) = None;
        self.write_slots(&slots).await
    }
}

/// In-memory tier that lives only as long as the process.
#[derive(Default)]
pub struct EphemeralTokenStorage {
    slots: Mutex<HashMap<TokenSlot, String>>,
}

impl EphemeralTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStorage for EphemeralTokenStorage {
    async fn get(&self, slot: TokenSlot) -> Result<Option<String>> {
        Ok(self.slots.lock().expect("token tier lock").get(&slot).cloned())
    }

    async fn put(&self, slot: TokenSlot, value: &str) -> Result<()> {
        self.slots
            .lock()
            .expect("token tier lock")
            .insert(slot, value.to_string());
        Ok(())
    }

    async fn remove(&self, slot: TokenSlot) -> Result<()> {
        self.slots.lock().expect("token tier lock").remove(&slot);
        Ok(())
    }
}

#[derive(Default)]
struct MemoryTokens {
    access: Option<SecretString>,
    refresh: Option<SecretString>,
    remember: bool,
}

/// Single source of truth for the current access/refresh tokens.
pub struct TokenManager {
    memory: RwLock<MemoryTokens>,
    durable: Arc<dyn TokenStorage>,
    ephemeral: Arc<dyn TokenStorage>,
    op_timeout: Duration,
}

impl TokenManager {
    /// Create a manager over the given tiers.
    pub fn new(
        durable: Arc<dyn TokenStorage>,
        ephemeral: Arc<dyn TokenStorage>,
        op_timeout: Duration,
    ) -> Self {
        Self {
            memory: RwLock::new(MemoryTokens::default()),
            durable,
            ephemeral,
            op_timeout,
        }
    }

    /// Manager with the default durable file and a fresh ephemeral tier.
    pub fn from_config(auth: &AuthConfig) -> Result<Self> {
        let path = paths::tokens_file().map_err(|e| SessionError::Storage(e.to_string()))?;
        Ok(Self::new(
            Arc::new(DurableTokenStorage::new(path)),
            Arc::new(EphemeralTokenStorage::new()),
            Duration::from_secs(auth.storage_timeout_secs),
        ))
    }

    /// Seed memory from whichever tier persisted tokens from a previous run.
    ///
    /// The ephemeral tier is per-process, so after a restart only the durable
    /// tier can contribute; finding tokens there implies the remember flag.
    pub async fn hydrate(&self) {
        let access = self.tier_get(&*self.durable, TokenSlot::Access).await;
        let refresh = self.tier_get(&*self.durable, TokenSlot::Refresh).await;
        if access.is_none() && refresh.is_none() {
            return;
        }

        let mut memory = self.memory.write().expect("token memory lock");
        memory.access = access.map(SecretString::new);
        memory.refresh = refresh.map(SecretString::new);
        memory.remember = true;
        debug!("seeded token memory from durable tier");
    }

    /// Current access token, if any.
    pub fn access_token(&self) -> Option<SecretString> {
        self.memory.read().expect("token memory lock").access.clone()
    }

    /// Current refresh token, if any.
    pub fn refresh_token(&self) -> Option<SecretString> {
        self.memory.read().expect("token memory lock").refresh.clone()
    }

    /// Which tier the current tokens are mirrored into.
    pub fn remember(&self) -> bool {
        self.memory.read().expect("token memory lock").remember
    }

    /// Set the access token; mirror to the tier picked by `remember`.
    pub async fn set_access_token(&self, token: &str, remember: bool) {
        {
            let mut memory = self.memory.write().expect("token memory lock");
            memory.access = Some(SecretString::new(token));
            memory.remember = remember;
        }
        self.mirror(TokenSlot::Access, token, remember).await;
    }

    /// Set the refresh token; mirror to the tier picked by `remember`.
    pub async fn set_refresh_token(&self, token: &str, remember: bool) {
        {
            let mut memory = self.memory.write().expect("token memory lock");
            memory.refresh = Some(SecretString::new(token));
            memory.remember = remember;
        }
        self.mirror(TokenSlot::Refresh, token, remember).await;
    }

    /// Drop both tokens from memory and from both tiers.
    ///
    /// Both tiers are cleared regardless of which one was in use, so a tier
    /// mix-up from an earlier version can never resurrect a session.
    pub async fn clear(&self) {
        {
            let mut memory = self.memory.write().expect("token memory lock");
            *memory = MemoryTokens::default();
        }
        for slot in [TokenSlot::Access, TokenSlot::Refresh] {
            self.tier_remove(&*self.durable, slot).await;
            self.tier_remove(&*self.ephemeral, slot).await;
        }
    }

    /// Write `slot` to the chosen tier and drop it from the other.
    async fn mirror(&self, slot: TokenSlot, token: &str, remember: bool) {
        let (chosen, other): (&dyn TokenStorage, &dyn TokenStorage) = if remember {
            (&*self.durable, &*self.ephemeral)
        } else {
            (&*self.ephemeral, &*self.durable)
        };

        match tokio::time::timeout(self.op_timeout, chosen.put(slot, token)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("token mirror write failed, memory copy stands: {e}"),
            Err(_) => warn!("token mirror write timed out, memory copy stands"),
        }
        self.tier_remove(other, slot).await;
    }

    async fn tier_get(&self, tier: &dyn TokenStorage, slot: TokenSlot) -> Option<String> {
        match tokio::time::timeout(self.op_timeout, tier.get(slot)).await {
            Ok(Ok(value)) => value,
            Ok(Err(e)) => {
                warn!("token tier read failed, treating as empty: {e}");
                None
            }
            Err(_) => {
                warn!("token tier read timed out, treating as empty");
                None
            }
        }
    }

    async fn tier_remove(&self, tier: &dyn TokenStorage, slot: TokenSlot) {
        match tokio::time::timeout(self.op_timeout, tier.remove(slot)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("token tier remove failed: {e}"),
            Err(_) => warn!("token tier remove timed out"),
        }
    }
}
