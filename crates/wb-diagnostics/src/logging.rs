//! tracing-subscriber setup for binaries
//!
//! `RUST_LOG` wins over the configured filter when it is set.

use tracing_subscriber::EnvFilter;

/// Errors installing the global subscriber
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// Filter directive did not parse
    #[error("invalid log filter '{filter}': {message}")]
    InvalidFilter { filter: String, message: String },

    /// A global subscriber is already installed
    #[error("logging already initialized: {0}")]
    AlreadyInitialized(String),
}

/// Install a fmt subscriber writing to stderr
///
/// # Errors
/// - `LoggingError::InvalidFilter` if `filter` is not a valid directive
/// - `LoggingError::AlreadyInitialized` on a second call
pub fn init(filter: &str, json: bool) -> Result<(), LoggingError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(from_env) => from_env,
        Err(_) => EnvFilter::try_new(filter).map_err(|e| LoggingError::InvalidFilter {
            filter: filter.to_string(),
            message: e.to_string(),
        })?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))
}
