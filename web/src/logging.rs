//! Tracing setup for the CLI.

use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
/// Logs go to stderr so command output on stdout stays clean. Calling this
/// twice keeps the first subscriber.
pub fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let result = if config.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
    };

    if result.is_ok() {
        tracing::debug!(api_url = %config.api_url, "tracing initialized");
    }
}
