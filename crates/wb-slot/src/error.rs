//! Error types for durable slots
//!
//! - [`StoreError`]: raised by a [`crate::DurableStore`] implementation
//! - [`SlotError`]: a store or codec failure seen by a [`crate::DurableSlot`]
//!
//! Slots never return these from `init`/`update`; they are reported and
//! swallowed. Only [`crate::DurableSlot::resync`] hands one back.

use std::path::PathBuf;
use wb_diagnostics::DiagnosticKind;

/// Errors raised by a durable store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// IO error on the backing file
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Write would exceed the store's byte quota
    #[error("quota exceeded writing '{key}': needs {needed} bytes, {available} available")]
    QuotaExceeded {
        key: String,
        needed: usize,
        available: usize,
    },

    /// Store cannot be used at all
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create quota error
    pub fn quota_exceeded(key: impl Into<String>, needed: usize, available: usize) -> Self {
        Self::QuotaExceeded {
            key: key.into(),
            needed,
            available,
        }
    }
}

/// Failures of a slot's read or write path
#[derive(Debug, thiserror::Error)]
pub enum SlotError {
    /// Store read failed
    #[error("read of '{key}' failed: {source}")]
    Read {
        key: String,
        #[source]
        source: StoreError,
    },

    /// Stored text did not decode
    #[error("stored value under '{key}' is not valid: {source}")]
    Deserialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Value did not encode
    #[error("value for '{key}' could not be encoded: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Store write failed
    #[error("write of '{key}' failed: {source}")]
    Write {
        key: String,
        #[source]
        source: StoreError,
    },
}

impl SlotError {
    /// Key the failure concerns
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Read { key, .. }
            | Self::Deserialize { key, .. }
            | Self::Serialize { key, .. }
            | Self::Write { key, .. } => key,
        }
    }

    /// Diagnostic kind this failure is reported as
    ///
    /// Decode failures count as read failures for fallback purposes but keep
    /// their own kind; encode failures are write failures.
    #[must_use]
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            Self::Read { .. } => DiagnosticKind::ReadFailure,
            Self::Deserialize { .. } => DiagnosticKind::DeserializationFailure,
            Self::Serialize { .. } | Self::Write { .. } => DiagnosticKind::WriteFailure,
        }
    }

    /// Whether the failure happened on the write path
    #[inline]
    #[must_use]
    pub fn is_write(&self) -> bool {
        matches!(self, Self::Serialize { .. } | Self::Write { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_error_display() {
        let err = StoreError::quota_exceeded("notes", 120, 40);
        assert_eq!(
            err.to_string(),
            "quota exceeded writing 'notes': needs 120 bytes, 40 available"
        );
    }

    #[test]
    fn slot_error_kinds() {
        let read = SlotError::Read {
            key: "k".to_string(),
            source: StoreError::Unavailable("offline".to_string()),
        };
        assert_eq!(read.kind(), DiagnosticKind::ReadFailure);
        assert!(!read.is_write());
        assert_eq!(read.key(), "k");

        let decode = serde_json::from_str::<u32>("nope").unwrap_err();
        let deserialize = SlotError::Deserialize {
            key: "k".to_string(),
            source: decode,
        };
        assert_eq!(deserialize.kind(), DiagnosticKind::DeserializationFailure);

        let write = SlotError::Write {
            key: "k".to_string(),
            source: StoreError::quota_exceeded("k", 10, 0),
        };
        assert_eq!(write.kind(), DiagnosticKind::WriteFailure);
        assert!(write.is_write());
        assert!(write.to_string().starts_with("write of 'k' failed"));
    }

    #[test]
    fn io_error_keeps_path() {
        let err = StoreError::io_error(
            "/tmp/store/6b.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("/tmp/store/6b.json"));
    }
}
