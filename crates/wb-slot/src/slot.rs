//! Durable slot primitive
//!
//! The in-memory value is authoritative for reads; the stored copy is
//! authoritative only at initialization. Persistence is best-effort: a
//! failed write is reported, the slot is marked [`Durability::Diverged`],
//! and the in-memory value keeps the update.

use crate::error::SlotError;
use crate::store::DurableStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use wb_diagnostics::{default_reporter, Diagnostic, Reporter};

/// Relationship between the in-memory value and the stored copy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Durability {
    /// Store holds the current value
    Synced,
    /// Current value is the default and nothing has been written
    Unwritten,
    /// Last write failed; memory is ahead of the store
    Diverged,
}

/// Argument to [`DurableSlot::update`]
pub enum Next<'a, T> {
    /// Replace the current value
    Value(T),
    /// Derive the next value from the current one
    Derive(Box<dyn FnOnce(&T) -> T + 'a>),
}

impl<'a, T> Next<'a, T> {
    /// Wrap a function of the previous value
    #[inline]
    pub fn derive<F>(f: F) -> Self
    where
        F: FnOnce(&T) -> T + 'a,
    {
        Self::Derive(Box::new(f))
    }

    fn resolve(self, current: &T) -> T {
        match self {
            Self::Value(value) => value,
            Self::Derive(f) => f(current),
        }
    }
}

impl<T> From<T> for Next<'_, T> {
    fn from(value: T) -> Self {
        Self::Value(value)
    }
}

impl<T: fmt::Debug> fmt::Debug for Next<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Derive(_) => f.write_str("Derive(..)"),
        }
    }
}

/// One named value with load-on-init and write-through
pub struct DurableSlot<T> {
    key: String,
    current: T,
    durability: Durability,
    store: Arc<dyn DurableStore>,
    reporter: Arc<dyn Reporter>,
}

impl<T: Serialize + DeserializeOwned> DurableSlot<T> {
    /// Load `key` from `store`, or fall back to `default`
    ///
    /// Never fails: an absent, unreadable or undecodable value yields
    /// `default`. Failures go to the tracing reporter.
    pub fn init(key: impl Into<String>, default: T, store: Arc<dyn DurableStore>) -> Self {
        Self::init_with(key, default, store, default_reporter())
    }

    /// [`DurableSlot::init`] with an explicit reporter
    pub fn init_with(
        key: impl Into<String>,
        default: T,
        store: Arc<dyn DurableStore>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        let key = key.into();

        let (current, durability) = match load(&key, store.as_ref()) {
            Ok(Some(stored)) => (stored, Durability::Synced),
            Ok(None) => {
                tracing::debug!(key = %key, "no stored value, using default");
                (default, Durability::Unwritten)
            }
            Err(err) => {
                reporter.report(Diagnostic::new(err.kind(), err.to_string()).with_key(&key));
                (default, Durability::Unwritten)
            }
        };

        Self {
            key,
            current,
            durability,
            store,
            reporter,
        }
    }

    /// Apply `next`, then write the result through
    ///
    /// The new value is visible immediately and stays current even if the
    /// write fails.
    pub fn update<'a>(&mut self, next: impl Into<Next<'a, T>>) -> &T
    where
        T: 'a,
    {
        self.current = next.into().resolve(&self.current);

        match self.persist() {
            Ok(()) => self.durability = Durability::Synced,
            Err(err) => {
                self.durability = Durability::Diverged;
                self.reporter
                    .report(Diagnostic::new(err.kind(), err.to_string()).with_key(&self.key));
            }
        }

        &self.current
    }

    /// Replace the value
    #[inline]
    pub fn set(&mut self, value: T) -> &T {
        self.update(Next::Value(value))
    }

    /// Derive the value from the previous one
    #[inline]
    pub fn modify<F>(&mut self, f: F) -> &T
    where
        F: FnOnce(&T) -> T,
    {
        self.update(Next::derive(f))
    }

    /// Write the current value again
    ///
    /// Unlike `update`, the failure is returned instead of reported.
    ///
    /// # Errors
    /// - `SlotError::Serialize` if the value does not encode
    /// - `SlotError::Write` if the store rejects the write
    pub fn resync(&mut self) -> Result<(), SlotError> {
        match self.persist() {
            Ok(()) => {
                self.durability = Durability::Synced;
                Ok(())
            }
            Err(err) => {
                self.durability = Durability::Diverged;
                Err(err)
            }
        }
    }

    fn persist(&self) -> Result<(), SlotError> {
        let text = serde_json::to_string(&self.current).map_err(|source| SlotError::Serialize {
            key: self.key.clone(),
            source,
        })?;
        self.store
            .set(&self.key, &text)
            .map_err(|source| SlotError::Write {
                key: self.key.clone(),
                source,
            })
    }
}

impl<T> DurableSlot<T> {
    /// Current value
    #[inline]
    #[must_use]
    pub fn get(&self) -> &T {
        &self.current
    }

    /// Store key
    #[inline]
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether the store holds the current value
    #[inline]
    #[must_use]
    pub fn durability(&self) -> Durability {
        self.durability
    }

    /// Abandon the slot, keeping its value
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> T {
        self.current
    }
}

impl<T: fmt::Debug> fmt::Debug for DurableSlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DurableSlot")
            .field("key", &self.key)
            .field("current", &self.current)
            .field("durability", &self.durability)
            .finish_non_exhaustive()
    }
}

/// Read and decode `key`; empty text counts as absent
fn load<T: DeserializeOwned>(key: &str, store: &dyn DurableStore) -> Result<Option<T>, SlotError> {
    let raw = store.get(key).map_err(|source| SlotError::Read {
        key: key.to_string(),
        source,
    })?;

    match raw {
        Some(text) if !text.is_empty() => serde_json::from_str(&text)
            .map(Some)
            .map_err(|source| SlotError::Deserialize {
                key: key.to_string(),
                source,
            }),
        _ => Ok(None),
    }
}
