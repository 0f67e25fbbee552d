//! Logging bootstrap
//!
//! Installs the global `tracing` subscriber. `RUST_LOG` takes precedence over
//! the configured level.
//!
//! ```ignore
//! use extraction_infra::observability::init_tracing;
//!
//! init_tracing(&config.logging)?;
//! ```

use extraction_domain::{ExtractionError, LoggingConfig, Result};
use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber (plain or JSON) filtered by `EnvFilter`.
///
/// Calling this more than once is harmless: later calls leave the first
/// subscriber in place.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(config)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let installed = if config.json {
        builder.json().with_current_span(true).try_init()
    } else {
        builder.try_init()
    };

    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
    Ok(())
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.level).map_err(|err| {
            ExtractionError::Config(format!("invalid log level '{}': {err}", config.level))
        }),
    }
}
