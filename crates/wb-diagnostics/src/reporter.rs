//! Diagnostic records and the reporters that consume them

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// What happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Durable store could not be read; the default was used
    ReadFailure,
    /// Stored text could not be decoded; the default was used
    DeserializationFailure,
    /// Value could not be encoded or written; memory is ahead of the store
    WriteFailure,
    /// A pending value was replaced before its timer fired
    CommitSuperseded,
    /// A commit callback ran
    CommitFired,
    /// Teardown discarded a pending value
    CommitAbandoned,
}

impl DiagnosticKind {
    /// Default severity for this kind
    #[inline]
    #[must_use]
    pub fn severity(self) -> Severity {
        match self {
            Self::ReadFailure | Self::DeserializationFailure | Self::WriteFailure => {
                Severity::Warning
            }
            Self::CommitAbandoned => Severity::Info,
            Self::CommitSuperseded | Self::CommitFired => Severity::Debug,
        }
    }

    /// Whether this kind describes a swallowed failure
    #[inline]
    #[must_use]
    pub fn is_failure(self) -> bool {
        matches!(
            self,
            Self::ReadFailure | Self::DeserializationFailure | Self::WriteFailure
        )
    }

    /// Stable name used in logs
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ReadFailure => "read_failure",
            Self::DeserializationFailure => "deserialization_failure",
            Self::WriteFailure => "write_failure",
            Self::CommitSuperseded => "commit_superseded",
            Self::CommitFired => "commit_fired",
            Self::CommitAbandoned => "commit_abandoned",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity a reporter should log at
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Fine-grained scheduling detail
    Debug,
    /// Lifecycle event
    Info,
    /// Swallowed failure
    Warning,
}

/// One reported event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Event kind
    pub kind: DiagnosticKind,
    /// Store key involved, if any
    pub key: Option<String>,
    /// Human-readable detail
    pub message: String,
}

impl Diagnostic {
    /// Create diagnostic without a key
    #[inline]
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            key: None,
            message: message.into(),
        }
    }

    /// Attach the store key
    #[inline]
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Severity derived from the kind
    #[inline]
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "{} [{}]: {}", self.kind, key, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

/// Sink for diagnostics
///
/// Passed explicitly into every primitive. Implementations must not panic;
/// reporting happens on failure paths that are otherwise swallowed.
pub trait Reporter: Send + Sync {
    /// Consume one diagnostic
    fn report(&self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, diagnostic: Diagnostic) {
        let key = diagnostic.key.as_deref().unwrap_or("-");
        match diagnostic.severity() {
            Severity::Warning => tracing::warn!(
                kind = %diagnostic.kind,
                key,
                "{}",
                diagnostic.message
            ),
            Severity::Info => tracing::info!(
                kind = %diagnostic.kind,
                key,
                "{}",
                diagnostic.message
            ),
            Severity::Debug => tracing::debug!(
                kind = %diagnostic.kind,
                key,
                "{}",
                diagnostic.message
            ),
        }
    }
}

/// Drops every diagnostic
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn report(&self, _diagnostic: Diagnostic) {}
}

/// Keeps diagnostics in memory
#[derive(Debug, Default)]
pub struct RecordingReporter {
    inner: Mutex<Vec<Diagnostic>>,
}

impl RecordingReporter {
    /// Create empty recorder
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far
    #[must_use]
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.inner.lock().clone()
    }

    /// Number of diagnostics of one kind
    #[must_use]
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.inner.lock().iter().filter(|d| d.kind == kind).count()
    }

    /// Number of failure diagnostics
    #[must_use]
    pub fn failures(&self) -> usize {
        self.inner.lock().iter().filter(|d| d.kind.is_failure()).count()
    }

    /// Drop recorded diagnostics
    pub fn clear(&self) {
        self.inner.lock().clear();
    }
}

impl Reporter for RecordingReporter {
    fn report(&self, diagnostic: Diagnostic) {
        self.inner.lock().push(diagnostic);
    }
}

/// Reporter used when a caller supplies none
#[inline]
#[must_use]
pub fn default_reporter() -> Arc<dyn Reporter> {
    Arc::new(TracingReporter)
}
