//! Configuration loading and persistence.

use super::Config;
use crate::error::ConfigError;
use crate::paths;
use std::fs;
use std::path::Path;

impl Config {
    /// Load configuration from the default path.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = paths::config_file()?;
        Self::load(&path)
    }

    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        json5::from_str(content).map_err(|e| ConfigError::Json5(e.to_string()))
    }

    /// Save configuration to the default path.
    pub fn save_default(&self) -> Result<(), ConfigError> {
        let path = paths::config_file()?;
        self.save(&path)
    }

    /// Save configuration to a file path.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        // json5 doesn't ship a serializer; pretty JSON is valid JSON5.
        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write atomically
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, path)?;

        Ok(())
    }

    /// Validate the configuration, collecting all errors before returning.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.api.base_url.is_empty() {
            errors.push("api.base_url cannot be empty".to_string());
        } else if !self.api.base_url.starts_with("http://")
            && !self.api.base_url.starts_with("https://")
        {
            errors.push(format!(
                "api.base_url must start with http:// or https://, got {}",
                self.api.base_url
            ));
        }

        let nonzero = [
            ("api.request_timeout_secs", self.api.request_timeout_secs),
            ("auth.validate_timeout_secs", self.auth.validate_timeout_secs),
            (
                "auth.guard_validate_timeout_secs",
                self.auth.guard_validate_timeout_secs,
            ),
            ("auth.refresh_timeout_secs", self.auth.refresh_timeout_secs),
            ("auth.login_timeout_secs", self.auth.login_timeout_secs),
            ("auth.bootstrap_timeout_secs", self.auth.bootstrap_timeout_secs),
            ("auth.storage_timeout_secs", self.auth.storage_timeout_secs),
        ];
        for (name, value) in nonzero {
            if value == 0 {
                errors.push(format!("{name} cannot be 0"));
            }
        }

        if self.auth.bootstrap_timeout_secs < self.auth.validate_timeout_secs {
            errors.push(format!(
                "auth.bootstrap_timeout_secs ({}) must not be shorter than auth.validate_timeout_secs ({})",
                self.auth.bootstrap_timeout_secs, self.auth.validate_timeout_secs
            ));
        }

        if self.auth.max_login_attempts == 0 {
            errors.push("auth.max_login_attempts cannot be 0".to_string());
        }

        if self.auth.credential_ttl_days <= 0 {
            errors.push(format!(
                "auth.credential_ttl_days must be positive, got {}",
                self.auth.credential_ttl_days
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors.join("; ")))
        }
    }
}
