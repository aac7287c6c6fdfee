//! Configuration schema definitions.

use serde::{Deserialize, Serialize};

/// Main FieldOps client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Session and bootstrap settings.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote API configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the dashboard API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Upper bound for any single API request, in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// TCP connect timeout, in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

/// Session bootstrap and login configuration section.
///
/// The timeouts encode the bootstrap chain's latency contract: each network
/// step has its own bound and the whole chain races `bootstrap_timeout_secs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Who-am-i probe timeout during the app-shell bootstrap, in seconds.
    #[serde(default = "default_validate_timeout")]
    pub validate_timeout_secs: u64,

    /// Who-am-i probe timeout when a route guard triggers the check, in seconds.
    #[serde(default = "default_guard_validate_timeout")]
    pub guard_validate_timeout_secs: u64,

    /// Token refresh call timeout, in seconds.
    #[serde(default = "default_refresh_timeout")]
    pub refresh_timeout_secs: u64,

    /// Interactive/auto login call timeout, in seconds.
    #[serde(default = "default_login_timeout")]
    pub login_timeout_secs: u64,

    /// Hard upper bound for the whole bootstrap chain, in seconds.
    #[serde(default = "default_bootstrap_timeout")]
    pub bootstrap_timeout_secs: u64,

    /// Bound for any local persistent-storage operation, in seconds.
    #[serde(default = "default_storage_timeout")]
    pub storage_timeout_secs: u64,

    /// Consecutive rejected logins before the client blocks further attempts.
    #[serde(default = "default_max_login_attempts")]
    pub max_login_attempts: u32,

    /// How long login stays blocked after too many rejections, in seconds.
    #[serde(default = "default_login_cooldown")]
    pub login_cooldown_secs: u64,

    /// Lifetime of a remembered credential record, in days.
    #[serde(default = "default_credential_ttl_days")]
    pub credential_ttl_days: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            validate_timeout_secs: default_validate_timeout(),
            guard_validate_timeout_secs: default_guard_validate_timeout(),
            refresh_timeout_secs: default_refresh_timeout(),
            login_timeout_secs: default_login_timeout(),
            bootstrap_timeout_secs: default_bootstrap_timeout(),
            storage_timeout_secs: default_storage_timeout(),
            max_login_attempts: default_max_login_attempts(),
            login_cooldown_secs: default_login_cooldown(),
            credential_ttl_days: default_credential_ttl_days(),
        }
    }
}

fn default_validate_timeout() -> u64 {
    2
}

fn default_guard_validate_timeout() -> u64 {
    5
}

fn default_refresh_timeout() -> u64 {
    5
}

fn default_login_timeout() -> u64 {
    8
}

fn default_bootstrap_timeout() -> u64 {
    10
}

fn default_storage_timeout() -> u64 {
    3
}

fn default_max_login_attempts() -> u32 {
    10
}

fn default_login_cooldown() -> u64 {
    300
}

fn default_credential_ttl_days() -> i64 {
    90
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log level filter (overridden by `RUST_LOG`).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.auth.bootstrap_timeout_secs, 10);
        assert_eq!(config.auth.max_login_attempts, 10);
        assert_eq!(config.auth.credential_ttl_days, 90);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_empty_object_gets_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.api.request_timeout_secs, 30);
        assert_eq!(config.auth.validate_timeout_secs, 2);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"auth":{"bootstrap_timeout_secs":20}}"#).unwrap();
        assert_eq!(config.auth.bootstrap_timeout_secs, 20);
        assert_eq!(config.auth.storage_timeout_secs, 3);
    }
}
