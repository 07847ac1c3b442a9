//! Logging initialization: human-readable lines on stderr.
//!
//! Level precedence: `RUST_LOG`, then `--verbose` (debug), then the config.

use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use casegen_core::LoggingConfig;

pub fn init_logging(config: &LoggingConfig, verbose: bool) -> Result<()> {
    let level = if verbose {
        "debug".to_string()
    } else {
        config.level.clone()
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&level))
        .map_err(|e| anyhow!("Invalid log level {level:?}: {e}"))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init()
        .map_err(|e| anyhow!("Logging already initialized: {e}"))
}
