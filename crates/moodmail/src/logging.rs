//! Process-wide logging setup.
//!
//! Library code logs through both `log` and `tracing`; `log` records are
//! bridged into the tracing subscriber installed here.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

use crate::config::{LogFormat, LoggingConfig};
use crate::error::MoodmailError;

/// Builds the level filter. `RUST_LOG` wins over the configured level.
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global subscriber. Fails if one is already set.
pub fn init(config: &LoggingConfig) -> Result<(), MoodmailError> {
    tracing_log::LogTracer::init().map_err(|e| MoodmailError::Logging(e.to_string()))?;

    let registry = Registry::default().with(env_filter(config));
    let result = match config.format {
        LogFormat::Pretty => {
            tracing::subscriber::set_global_default(registry.with(fmt::layer().with_target(true)))
        }
        LogFormat::Json => tracing::subscriber::set_global_default(
            registry.with(fmt::layer().json().with_current_span(true)),
        ),
    };
    result.map_err(|e| MoodmailError::Logging(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_filter_falls_back_to_configured_level() {
        std::env::remove_var("RUST_LOG");
        let config = LoggingConfig {
            level: "moodmail=debug".to_string(),
            format: LogFormat::Pretty,
        };
        assert_eq!(env_filter(&config).to_string(), "moodmail=debug");
    }

    #[test]
    #[serial]
    fn test_filter_prefers_rust_log() {
        std::env::set_var("RUST_LOG", "warn");
        let filter = env_filter(&LoggingConfig::default());
        std::env::remove_var("RUST_LOG");
        assert_eq!(filter.to_string(), "warn");
    }

    #[test]
    #[serial]
    fn test_invalid_level_falls_back_to_info() {
        std::env::remove_var("RUST_LOG");
        let config = LoggingConfig {
            level: "moodmail=loudest".to_string(),
            format: LogFormat::Json,
        };
        assert_eq!(env_filter(&config).to_string(), "info");
    }
}
