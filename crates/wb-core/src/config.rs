//! Workspace configuration
//!
//! Loaded from TOML. Every section is optional:
//!
//! ```toml
//! [store]
//! kind = "file"
//! path = "/home/me/.writersblock"
//!
//! [autosave]
//! delay_ms = 1500
//!
//! [logging]
//! filter = "wb=debug,info"
//! json = false
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Autosave delay when none is configured
pub const DEFAULT_AUTOSAVE_DELAY_MS: u64 = 2000;

/// Longest accepted autosave delay (ten minutes)
pub const MAX_AUTOSAVE_DELAY_MS: u64 = 600_000;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Where durable slots persist
    pub store: StoreConfig,
    /// Editor autosave
    pub autosave: AutoSaveConfig,
    /// Log output
    pub logging: LogConfig,
}

impl WorkspaceConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate TOML text
    ///
    /// # Errors
    /// - `ConfigError::Parse` on malformed TOML or unknown values
    /// - `ConfigError::Invalid` if validation fails
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    /// - `ConfigError::Io` if the file cannot be read
    /// - see [`WorkspaceConfig::from_toml_str`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::io_error(path, e))?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// - `ConfigError::Invalid` naming the offending field
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let StoreConfig::File { path } = &self.store {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::Invalid("store.path must not be empty".to_string()));
            }
        }
        if self.autosave.delay_ms > MAX_AUTOSAVE_DELAY_MS {
            return Err(ConfigError::Invalid(format!(
                "autosave.delay_ms must be at most {MAX_AUTOSAVE_DELAY_MS}, got {}",
                self.autosave.delay_ms
            )));
        }
        if self.logging.filter.trim().is_empty() {
            return Err(ConfigError::Invalid("logging.filter must not be empty".to_string()));
        }
        Ok(())
    }

    /// With store
    #[inline]
    #[must_use]
    pub fn with_store(mut self, store: StoreConfig) -> Self {
        self.store = store;
        self
    }

    /// With autosave delay
    #[inline]
    #[must_use]
    pub fn with_autosave_delay(mut self, delay: Duration) -> Self {
        self.autosave.delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// With log filter
    #[inline]
    #[must_use]
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.logging.filter = filter.into();
        self
    }
}

/// Durable store selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreConfig {
    /// Process-local store, lost on exit
    Memory {
        /// Byte quota on keys plus values
        quota_bytes: Option<usize>,
    },
    /// One file per key under `path`
    File {
        /// Store directory
        path: PathBuf,
    },
}

impl StoreConfig {
    /// File store rooted at `path`
    #[inline]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File { path: path.into() }
    }

    /// Values survive the process
    #[inline]
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        matches!(self, Self::File { .. })
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::Memory { quota_bytes: None }
    }
}

/// Editor autosave settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoSaveConfig {
    /// Quiet period before a draft is saved
    pub delay_ms: u64,
}

impl AutoSaveConfig {
    /// Quiet period as a duration
    #[inline]
    #[must_use]
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for AutoSaveConfig {
    fn default() -> Self {
        Self {
            delay_ms: DEFAULT_AUTOSAVE_DELAY_MS,
        }
    }
}

/// Log output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing-subscriber` filter directive
    pub filter: String,
    /// Emit JSON lines instead of text
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}
