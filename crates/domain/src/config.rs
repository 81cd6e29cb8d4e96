//! Configuration management

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_REFRESH_MARGIN_SECS, DEFAULT_REQUEST_TIMEOUT_MS, DEFAULT_SESSION_STORE,
    DEFAULT_TOKEN_LIFETIME_SECS,
};
use crate::impl_wire_enum_conversions;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend API configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Session and refresh policy configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Path of the persisted cookie-like key/value file
    pub store_path: String,
    /// Assumed access token lifetime when the server omits `expires_in`
    pub token_lifetime_secs: u64,
    /// How long before expiry the proactive refresh fires
    pub refresh_margin_secs: u64,
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl_wire_enum_conversions!(LogFormat {
    Pretty => "pretty",
    Json => "json",
});

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `hotelops_infra=debug`
    pub level: String,
    pub format: LogFormat,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

impl ApiConfig {
    /// Request timeout as a [`Duration`]
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl SessionConfig {
    /// Fallback token lifetime as a [`Duration`]
    #[must_use]
    pub const fn token_lifetime(&self) -> Duration {
        Duration::from_secs(self.token_lifetime_secs)
    }

    /// Safety margin before expiry as a [`Duration`]
    #[must_use]
    pub const fn refresh_margin(&self) -> Duration {
        Duration::from_secs(self.refresh_margin_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            store_path: DEFAULT_SESSION_STORE.to_string(),
            token_lifetime_secs: DEFAULT_TOKEN_LIFETIME_SECS,
            refresh_margin_secs: DEFAULT_REFRESH_MARGIN_SECS,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: LogFormat::Pretty }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_policy_constants() {
        let config = Config::default();

        assert_eq!(config.api.timeout(), Duration::from_secs(10));
        assert_eq!(config.session.token_lifetime(), Duration::from_secs(900));
        assert_eq!(config.session.refresh_margin(), Duration::from_secs(60));
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: Config =
            serde_json::from_str(r#"{ "api": { "base_url": "https://api.instay.test" } }"#)
                .unwrap();

        assert_eq!(config.api.base_url, "https://api.instay.test");
        assert_eq!(config.api.timeout_ms, DEFAULT_REQUEST_TIMEOUT_MS);
        assert_eq!(config.session, SessionConfig::default());
    }

    #[test]
    fn log_format_parses_case_insensitively() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!(LogFormat::Pretty.to_string(), "pretty");
        assert!("yaml".parse::<LogFormat>().is_err());
    }
}
