//! WritersBlock Durable Slot
//!
//! A [`DurableSlot`] wraps one named value: it loads from a [`DurableStore`]
//! on initialization and writes through on every update. Storage problems
//! never reach the caller; they are reported and the slot keeps working on
//! its in-memory value.
//!
//! # Architecture
//!
//! ```text
//! caller ── update(next) ──► DurableSlot ── serde_json ──► DurableStore
//!                               │  ▲                       (MemoryStore / FileStore)
//!                               │  └── init: read or default
//!                               └── Reporter (swallowed failures)
//! ```
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use wb_slot::{DurableSlot, MemoryStore};
//!
//! let store = Arc::new(MemoryStore::new());
//! let mut counter = DurableSlot::init("counter", 5_u32, store.clone());
//! counter.modify(|prev| prev + 1);
//! assert_eq!(*counter.get(), 6);
//!
//! // A fresh slot over the same store sees the persisted value
//! let reloaded = DurableSlot::init("counter", 0_u32, store);
//! assert_eq!(*reloaded.get(), 6);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod error;
mod slot;
pub mod store;

pub use error::{SlotError, StoreError};
pub use slot::{Durability, DurableSlot, Next};
pub use store::{DurableStore, FileStore, MemoryStore};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with durable slots
    pub use crate::error::{SlotError, StoreError};
    pub use crate::slot::{Durability, DurableSlot, Next};
    pub use crate::store::{DurableStore, FileStore, MemoryStore};
}
