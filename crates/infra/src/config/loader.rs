//! Configuration loader
//!
//! Loads session client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `HOTELOPS_API_URL` is missing, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `HOTELOPS_API_URL`: Backend base URL (required)
//! - `HOTELOPS_API_TIMEOUT_MS`: Request timeout in milliseconds
//! - `HOTELOPS_SESSION_STORE`: Path of the persisted session file
//! - `HOTELOPS_TOKEN_LIFETIME_SECS`: Assumed token lifetime when the server
//!   omits `expires_in`
//! - `HOTELOPS_REFRESH_MARGIN_SECS`: Seconds before expiry to refresh
//! - `HOTELOPS_LOG_LEVEL`: `EnvFilter` directive
//! - `HOTELOPS_LOG_FORMAT`: `pretty` or `json`
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./hotelops.json` or `./hotelops.toml` (current working directory)
//! 2. `./config.json` or `./config.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use hotelops_domain::{
    ApiConfig, Config, HotelOpsError, LogFormat, LoggingConfig, Result, SessionConfig,
};

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `HotelOpsError::Config` if configuration cannot be loaded from
/// either source, the file format is invalid, or a value fails to parse.
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// Only `HOTELOPS_API_URL` is required; every other value falls back to its
/// default.
///
/// # Errors
/// Returns `HotelOpsError::Config` if the base URL is missing or any value
/// is invalid.
pub fn load_from_env() -> Result<Config> {
    let base_url = env_var("HOTELOPS_API_URL")?;
    let defaults = Config::default();

    let timeout_ms = env_parse("HOTELOPS_API_TIMEOUT_MS", defaults.api.timeout_ms)?;
    let store_path =
        std::env::var("HOTELOPS_SESSION_STORE").unwrap_or(defaults.session.store_path);
    let token_lifetime_secs =
        env_parse("HOTELOPS_TOKEN_LIFETIME_SECS", defaults.session.token_lifetime_secs)?;
    let refresh_margin_secs =
        env_parse("HOTELOPS_REFRESH_MARGIN_SECS", defaults.session.refresh_margin_secs)?;
    let level = std::env::var("HOTELOPS_LOG_LEVEL").unwrap_or(defaults.logging.level);
    let format = match std::env::var("HOTELOPS_LOG_FORMAT") {
        Ok(raw) => LogFormat::from_str(&raw).map_err(HotelOpsError::Config)?,
        Err(_) => defaults.logging.format,
    };

    let config = Config {
        api: ApiConfig { base_url, timeout_ms },
        session: SessionConfig { store_path, token_lifetime_secs, refresh_margin_secs },
        logging: LoggingConfig { level, format },
    };
    validate(&config)?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `HotelOpsError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(HotelOpsError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            HotelOpsError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| HotelOpsError::Config(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    validate(&config)?;
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| HotelOpsError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| HotelOpsError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(HotelOpsError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Reject configurations the session layer cannot run with
fn validate(config: &Config) -> Result<()> {
    url::Url::parse(&config.api.base_url).map_err(|e| {
        HotelOpsError::Config(format!("Invalid base URL '{}': {e}", config.api.base_url))
    })?;

    if config.api.timeout_ms == 0 {
        return Err(HotelOpsError::Config("Request timeout must be greater than zero".into()));
    }

    if config.session.refresh_margin_secs >= config.session.token_lifetime_secs {
        return Err(HotelOpsError::Config(format!(
            "Refresh margin ({}s) must be shorter than the token lifetime ({}s)",
            config.session.refresh_margin_secs, config.session.token_lifetime_secs
        )));
    }

    Ok(())
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    const NAMES: [&str; 6] = [
        "hotelops.json",
        "hotelops.toml",
        "config.json",
        "config.toml",
        "../config.json",
        "../config.toml",
    ];

    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(NAMES.iter().map(|name| cwd.join(name)));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(NAMES.iter().map(|name| exe_dir.join(name)));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        HotelOpsError::Config(format!("Missing required environment variable: {key}"))
    })
}

/// Parse an optional numeric environment variable, using `default` when unset
fn env_parse(key: &str, default: u64) -> Result<u64> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|e| HotelOpsError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use once_cell::sync::Lazy;
    use tempfile::Builder;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const ENV_KEYS: [&str; 7] = [
        "HOTELOPS_API_URL",
        "HOTELOPS_API_TIMEOUT_MS",
        "HOTELOPS_SESSION_STORE",
        "HOTELOPS_TOKEN_LIFETIME_SECS",
        "HOTELOPS_REFRESH_MARGIN_SECS",
        "HOTELOPS_LOG_LEVEL",
        "HOTELOPS_LOG_FORMAT",
    ];

    fn clear_env() {
        for key in ENV_KEYS {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_load_from_env_with_defaults() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        std::env::set_var("HOTELOPS_API_URL", "https://api.instay.test");

        let config = load_from_env().unwrap();
        assert_eq!(config.api.base_url, "https://api.instay.test");
        assert_eq!(config.api.timeout_ms, 10_000);
        assert_eq!(config.session, SessionConfig::default());

        clear_env();
    }

    #[test]
    fn test_load_from_env_overrides() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        std::env::set_var("HOTELOPS_API_URL", "https://api.instay.test");
        std::env::set_var("HOTELOPS_API_TIMEOUT_MS", "2500");
        std::env::set_var("HOTELOPS_TOKEN_LIFETIME_SECS", "300");
        std::env::set_var("HOTELOPS_REFRESH_MARGIN_SECS", "30");
        std::env::set_var("HOTELOPS_LOG_FORMAT", "JSON");

        let config = load_from_env().unwrap();
        assert_eq!(config.api.timeout_ms, 2500);
        assert_eq!(config.session.token_lifetime_secs, 300);
        assert_eq!(config.session.refresh_margin_secs, 30);
        assert_eq!(config.logging.format, LogFormat::Json);

        clear_env();
    }

    #[test]
    fn test_load_from_env_missing_url() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        let err = load_from_env().unwrap_err();
        assert!(matches!(err, HotelOpsError::Config(msg) if msg.contains("HOTELOPS_API_URL")));
    }

    #[test]
    fn test_load_from_env_invalid_number() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        std::env::set_var("HOTELOPS_API_URL", "https://api.instay.test");
        std::env::set_var("HOTELOPS_API_TIMEOUT_MS", "ten seconds");

        assert!(load_from_env().is_err());

        clear_env();
    }

    #[test]
    fn test_parse_toml_config() {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[api]
base_url = "https://api.instay.test"
timeout_ms = 5000

[session]
store_path = "/tmp/hotelops-session.json"
refresh_margin_secs = 45
"#
        )
        .unwrap();

        let config = load_from_file(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.api.timeout_ms, 5000);
        assert_eq!(config.session.store_path, "/tmp/hotelops-session.json");
        assert_eq!(config.session.refresh_margin_secs, 45);
        assert_eq!(config.session.token_lifetime_secs, 900);
    }

    #[test]
    fn test_margin_longer_than_lifetime_is_rejected() {
        let mut file = Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{ "api": {{ "base_url": "https://api.instay.test" }},
                 "session": {{ "token_lifetime_secs": 60, "refresh_margin_secs": 60 }} }}"#
        )
        .unwrap();

        let err = load_from_file(Some(file.path().to_path_buf())).unwrap_err();
        assert!(matches!(err, HotelOpsError::Config(msg) if msg.contains("Refresh margin")));
    }

    #[test]
    fn test_unsupported_extension() {
        let file = Builder::new().suffix(".yaml").tempfile().unwrap();
        let err = load_from_file(Some(file.path().to_path_buf())).unwrap_err();
        assert!(matches!(err, HotelOpsError::Config(msg) if msg.contains("Unsupported")));
    }

    #[test]
    fn test_missing_file() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/hotelops.json")));
        assert!(result.is_err());
    }
}
