//! Testing utilities for WritersBlock workspace
//!
//! Shared test helpers, fixtures, and failure-injecting stores.

#![allow(missing_docs)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use wb_core::{Note, NoteCategory, NOTES_KEY};
use wb_slot::{DurableStore, MemoryStore, StoreError};

/// Memory store whose reads and writes can be switched to fail
#[derive(Debug, Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
    rejected_writes: AtomicUsize,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Successful writes
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn rejected_writes(&self) -> usize {
        self.rejected_writes.load(Ordering::SeqCst)
    }

    /// Underlying store, bypassing failure injection
    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }
}

impl DurableStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("injected read failure for '{key}'")));
        }
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            self.rejected_writes.fetch_add(1, Ordering::SeqCst);
            return Err(StoreError::Unavailable(format!("injected write failure for '{key}'")));
        }
        self.inner.set(key, value)?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// One note per category
pub fn sample_notes() -> Vec<Note> {
    vec![
        Note::new("Mira", "Lighthouse keeper, afraid of boats", NoteCategory::Person),
        Note::new("Gull Harbor", "Fog every morning until ten", NoteCategory::Place),
        Note::new("The Wreck", "A ship runs aground in chapter three", NoteCategory::Plot),
        Note::new("Tone", "Quiet, salt-bitten", NoteCategory::Misc),
    ]
}

/// Memory store already holding `notes` under the notes key
pub fn seeded_store(notes: &[Note]) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    let json = serde_json::to_string(notes).unwrap();
    store.set(NOTES_KEY, &json).unwrap();
    store
}
