//! Logging setup for Errand binaries.

use thiserror::Error;
use tracing_subscriber::{
    EnvFilter, filter::ParseError, fmt, layer::SubscriberExt, util::SubscriberInitExt,
    util::TryInitError,
};

/// Errors raised while installing the global subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The filter directive could not be parsed.
    #[error("invalid log filter: {0}")]
    InvalidFilter(#[from] ParseError),

    /// A global subscriber is already installed.
    #[error("failed to install log subscriber: {0}")]
    Install(#[from] TryInitError),
}

/// Builds the event filter, preferring `RUST_LOG` over `default_filter`.
///
/// # Errors
///
/// Returns [`TelemetryError::InvalidFilter`] when `default_filter` is needed
/// and cannot be parsed.
pub fn env_filter(default_filter: &str) -> Result<EnvFilter, TelemetryError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => Ok(EnvFilter::try_new(default_filter)?),
    }
}

/// Installs a formatted `tracing` subscriber writing to standard error.
///
/// # Errors
///
/// Returns [`TelemetryError`] when the filter is invalid or a subscriber is
/// already installed.
pub fn init_tracing(default_filter: &str) -> Result<(), TelemetryError> {
    tracing_subscriber::registry()
        .with(env_filter(default_filter)?)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init()?;
    Ok(())
}
