//! In-memory durable store
//!
//! Survives only as long as the process, but behaves like browser local
//! storage otherwise, including an optional quota on total bytes.

use super::DurableStore;
use crate::error::StoreError;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Concurrent string map
///
/// Usage is counted as key bytes plus value bytes per entry. A write that
/// would push usage over the quota fails and leaves the old value in place.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, String>,
    used: AtomicUsize,
    quota: Option<usize>,
}

impl MemoryStore {
    /// Create unbounded store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create store limited to `bytes` of keys and values
    #[inline]
    #[must_use]
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            quota: Some(bytes),
            ..Self::default()
        }
    }

    /// Remove a key, returning its text
    pub fn remove(&self, key: &str) -> Option<String> {
        let (key, value) = self.entries.remove(key)?;
        self.used.fetch_sub(key.len() + value.len(), Ordering::SeqCst);
        Some(value)
    }

    /// All keys, sorted
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }

    /// Number of keys
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// No keys stored
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bytes counted against the quota
    #[inline]
    #[must_use]
    pub fn used_bytes(&self) -> usize {
        self.used.load(Ordering::SeqCst)
    }

    /// Configured quota, if any
    #[inline]
    #[must_use]
    pub fn quota(&self) -> Option<usize> {
        self.quota
    }

    /// Swap `release` bytes of usage for `needed` bytes, within quota
    fn reserve(&self, key: &str, release: usize, needed: usize) -> Result<(), StoreError> {
        let quota = self.quota;
        self.used
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |used| {
                let next = used + needed - release;
                quota.map_or(true, |q| next <= q).then_some(next)
            })
            .map(|_| ())
            .map_err(|used| {
                let available = quota.unwrap_or(usize::MAX).saturating_sub(used - release);
                StoreError::quota_exceeded(key, needed, available)
            })
    }
}

impl DurableStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let needed = key.len() + value.len();
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut entry) => {
                let release = key.len() + entry.get().len();
                self.reserve(key, release, needed)?;
                entry.insert(value.to_string());
            }
            Entry::Vacant(entry) => {
                self.reserve(key, 0, needed)?;
                entry.insert(value.to_string());
            }
        }
        Ok(())
    }
}
