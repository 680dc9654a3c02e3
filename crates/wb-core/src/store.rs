//! Store construction from configuration

use crate::config::StoreConfig;
use std::sync::Arc;
use wb_slot::{DurableStore, FileStore, MemoryStore, StoreError};

/// Build the durable store `config` selects
///
/// # Errors
/// - `StoreError::Io` if a file store directory cannot be created
pub fn open_store(config: &StoreConfig) -> Result<Arc<dyn DurableStore>, StoreError> {
    let store: Arc<dyn DurableStore> = match config {
        StoreConfig::Memory { quota_bytes: None } => Arc::new(MemoryStore::new()),
        StoreConfig::Memory {
            quota_bytes: Some(quota),
        } => Arc::new(MemoryStore::with_quota(*quota)),
        StoreConfig::File { path } => Arc::new(FileStore::open(path)?),
    };
    tracing::debug!(persistent = config.is_persistent(), "durable store ready");
    Ok(store)
}
