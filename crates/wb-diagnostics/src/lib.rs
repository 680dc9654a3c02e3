//! WritersBlock Diagnostics
//!
//! Explicit failure and lifecycle reporting for the persistence primitives.
//!
//! Nothing in the workspace reaches for global error-reporting state. Each
//! primitive takes an `Arc<dyn Reporter>` at construction and hands it every
//! [`Diagnostic`] it produces.
//!
//! # Reporters
//!
//! - [`TracingReporter`]: forwards diagnostics to `tracing` (the default)
//! - [`NullReporter`]: drops everything
//! - [`RecordingReporter`]: keeps diagnostics in memory for assertions
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use wb_diagnostics::{Diagnostic, DiagnosticKind, RecordingReporter, Reporter};
//!
//! let reporter = Arc::new(RecordingReporter::new());
//! reporter.report(Diagnostic::new(DiagnosticKind::WriteFailure, "quota exceeded").with_key("notes"));
//!
//! assert_eq!(reporter.count(DiagnosticKind::WriteFailure), 1);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod logging;
mod reporter;

pub use logging::{init as init_logging, LoggingError};
pub use reporter::{
    default_reporter, Diagnostic, DiagnosticKind, NullReporter, RecordingReporter, Reporter,
    Severity, TracingReporter,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
