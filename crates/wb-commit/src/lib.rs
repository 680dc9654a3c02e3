//! WritersBlock Debounced Commit
//!
//! Commits the latest value of a rapidly changing input only after the input
//! has been quiet for a configurable period. Used by the editor to avoid a
//! save on every keystroke.
//!
//! # Guarantees
//!
//! - At most one commit timer is live per [`Debouncer`]
//! - N observations inside one quiet period produce exactly one commit,
//!   carrying the Nth value
//! - The commit never fires earlier than `delay` after the last observation
//! - The commit never runs inside the `observe` call, even for a zero delay
//! - Dropping the debouncer cancels the pending commit
//!
//! # Example
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use wb_commit::Debouncer;
//!
//! # async fn example() -> Result<(), wb_commit::DebounceError> {
//! let mut autosave = Debouncer::new(|text: String| save(&text), Duration::from_millis(2000))?;
//!
//! autosave.observe("It was".to_string());
//! autosave.observe("It was a dark".to_string());
//! // ~2s later `save("It was a dark")` runs once
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod debouncer;
mod error;
mod status;

pub use debouncer::{CommitFn, Debouncer, DEFAULT_DELAY};
pub use error::DebounceError;
pub use status::CommitStatus;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
