//! Error types for the debounced commit primitive

/// Errors constructing a [`crate::Debouncer`]
///
/// Nothing after construction fails: errors raised by the commit callback
/// belong to the callback.
#[derive(Debug, thiserror::Error)]
pub enum DebounceError {
    /// No tokio runtime to schedule commit timers on
    #[error("no tokio runtime available: {0}")]
    NoRuntime(String),
}
