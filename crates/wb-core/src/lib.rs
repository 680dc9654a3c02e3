//! WritersBlock Core
//!
//! Application layer over the commit and slot primitives:
//!
//! - [`WorkspaceConfig`]: TOML configuration (store, autosave, logging)
//! - [`EditorSession`]: the document being written, autosaved through a
//!   [`wb_commit::Debouncer`] into a [`wb_slot::DurableSlot`]
//! - [`NotesBoard`]: character, place and plot notes in a durable slot
//! - [`open_store`]: build the configured [`wb_slot::DurableStore`]
//!
//! # Example
//!
//! ```rust,no_run
//! use wb_core::prelude::*;
//!
//! # async fn example() -> CoreResult<()> {
//! let config = WorkspaceConfig::load("wb.toml")?;
//! let store = open_store(&config.store)?;
//!
//! let mut session = EditorSession::open(store.clone(), &config.autosave)?;
//! session.set_text("It was a dark and stormy night.");
//!
//! let mut notes = NotesBoard::open(store);
//! notes.add("Mira", "Lighthouse keeper", NoteCategory::Person)?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
mod error;
pub mod notes;
pub mod records;
pub mod session;
mod store;

pub use config::{AutoSaveConfig, LogConfig, StoreConfig, WorkspaceConfig};
pub use error::{ConfigError, CoreError, CoreResult, NoteError};
pub use notes::{NotesBoard, MAX_NOTES, NOTES_KEY};
pub use records::{
    word_count, EditorContent, Note, NoteCategory, NoteFilter, NoteId, ParseCategoryError,
};
pub use session::{EditorSession, EDITOR_KEY};
pub use store::open_store;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for WritersBlock applications
    pub use crate::config::{AutoSaveConfig, StoreConfig, WorkspaceConfig};
    pub use crate::error::{CoreError, CoreResult, NoteError};
    pub use crate::notes::NotesBoard;
    pub use crate::records::{EditorContent, Note, NoteCategory, NoteFilter, NoteId};
    pub use crate::session::EditorSession;
    pub use crate::store::open_store;
    pub use wb_slot::{Durability, DurableStore};
}
