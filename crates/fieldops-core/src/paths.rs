//! Path resolution utilities.

use crate::error::ConfigError;
use std::path::PathBuf;

/// Get the FieldOps base directory (~/.fieldops).
pub fn base_dir() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or_else(|| {
        ConfigError::Validation("Could not determine home directory".to_string())
    })?;
    Ok(home.join(".fieldops"))
}

/// Get the main config file path (~/.fieldops/fieldops.json5).
pub fn config_file() -> Result<PathBuf, ConfigError> {
    Ok(base_dir()?.join("fieldops.json5"))
}

/// Get the credentials directory (~/.fieldops/credentials).
pub fn credentials_dir() -> Result<PathBuf, ConfigError> {
    Ok(base_dir()?.join("credentials"))
}

/// Get the remembered-credential record path (~/.fieldops/credentials/remembered.json).
pub fn credential_file() -> Result<PathBuf, ConfigError> {
    Ok(credentials_dir()?.join("remembered.json"))
}

/// Get the durable client-state directory (~/.fieldops/state).
pub fn state_dir() -> Result<PathBuf, ConfigError> {
    Ok(base_dir()?.join("state"))
}

/// Get the durable token slots file (~/.fieldops/state/tokens.json).
pub fn tokens_file() -> Result<PathBuf, ConfigError> {
    Ok(state_dir()?.join("tokens.json"))
}

/// Get the persisted session snapshot file (~/.fieldops/state/session.json).
pub fn session_state_file() -> Result<PathBuf, ConfigError> {
    Ok(state_dir()?.join("session.json"))
}

/// Ensure all required directories exist.
pub fn ensure_dirs() -> Result<(), ConfigError> {
    let dirs = [base_dir()?, credentials_dir()?, state_dir()?];

    for dir in dirs {
        std::fs::create_dir_all(&dir)?;
    }

    Ok(())
}
