//! Error types for WritersBlock core
//!
//! Provides error handling for:
//! - Configuration loading and validation
//! - Notes board operations
//! - Opening stores and sessions

use crate::records::NoteId;
use std::path::PathBuf;
use wb_commit::DebounceError;
use wb_slot::StoreError;

/// Main core error type
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Durable store could not be opened
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Autosave could not be scheduled
    #[error("autosave error: {0}")]
    Autosave(#[from] DebounceError),

    /// Notes board rejected an operation
    #[error("notes error: {0}")]
    Notes(#[from] NoteError),
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading the config file
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML did not parse into a config
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Parsed config failed validation
    #[error("invalid config value: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Notes board errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NoteError {
    /// Title empty after trimming
    #[error("note title must not be blank")]
    BlankTitle,

    /// Board is full
    #[error("notes board is full ({limit} notes)")]
    LimitReached { limit: usize },

    /// No note with this id
    #[error("note not found: {0}")]
    NotFound(NoteId),
}

/// Result type alias for core operations
pub type CoreResult<T> = Result<T, CoreError>;
