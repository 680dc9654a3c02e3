//! Durable store collaborator
//!
//! A string-keyed, string-valued persistence medium. Slots own the encoding
//! of whatever they write; stores only move text.
//!
//! - [`MemoryStore`]: process-local map with an optional byte quota
//! - [`FileStore`]: one file per key under a directory

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::StoreError;

/// Key-value persistence addressed by string key
#[cfg_attr(test, mockall::automock)]
pub trait DurableStore: Send + Sync {
    /// Read the text stored under `key`
    ///
    /// # Errors
    /// Any failure to reach or read the medium. A missing key is `Ok(None)`.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the text stored under `key`
    ///
    /// # Errors
    /// Any failure to persist; the previous value must survive a failed write.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}
