//! Structured logging setup
//!
//! The session layer only emits `tracing` events; installing a subscriber is
//! left to the embedding binary, which can call [`init_tracing`] with the
//! loaded [`LoggingConfig`].

use hotelops_domain::{LogFormat, LoggingConfig};
use tracing_subscriber::fmt;
use tracing_subscriber::EnvFilter;

/// Install the global `fmt` subscriber.
///
/// An invalid filter directive falls back to `info`. Uses `try_init`, so a
/// second call (or a subscriber installed by a test harness) is ignored.
pub fn init_tracing(config: &LoggingConfig) {
    let filter = build_filter(&config.level);

    let result = match config.format {
        LogFormat::Json => fmt().with_env_filter(filter).json().try_init(),
        LogFormat::Pretty => fmt().with_env_filter(filter).try_init(),
    };
    drop(result);
}

fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
}
