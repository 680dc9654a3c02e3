//! Slot behavior against real and failure-injecting stores

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tempfile::TempDir;
use wb_diagnostics::{DiagnosticKind, RecordingReporter};
use wb_slot::prelude::*;
use wb_test_utils::FlakyStore;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Canvas {
    nodes: Vec<String>,
    zoom: f32,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            zoom: 1.0,
        }
    }
}

#[test]
fn diverged_slot_recovers_with_resync() {
    let store = FlakyStore::shared();
    let reporter = Arc::new(RecordingReporter::new());
    let mut slot = DurableSlot::init_with("counter", 0_u32, store.clone(), reporter.clone());

    store.fail_writes(true);
    slot.modify(|n| n + 1);
    assert_eq!(*slot.get(), 1);
    assert_eq!(slot.durability(), Durability::Diverged);
    assert_eq!(reporter.count(DiagnosticKind::WriteFailure), 1);
    assert!(store.inner().get("counter").unwrap().is_none());

    let err = slot.resync().unwrap_err();
    assert!(err.is_write());
    assert_eq!(err.key(), "counter");
    assert_eq!(store.rejected_writes(), 2);

    store.fail_writes(false);
    slot.resync().unwrap();
    assert_eq!(slot.durability(), Durability::Synced);
    assert_eq!(store.inner().get("counter").unwrap().as_deref(), Some("1"));
}

#[test]
fn failing_write_leaves_previous_stored_value() {
    let store = FlakyStore::shared();
    let mut slot = DurableSlot::init("title", String::new(), store.clone());
    slot.set("Draft one".to_string());

    store.fail_writes(true);
    slot.set("Draft two".to_string());
    assert_eq!(slot.get(), "Draft two");

    let reloaded = DurableSlot::init("title", String::new(), store);
    assert_eq!(reloaded.get(), "Draft one");
}

#[test]
fn unreadable_store_starts_from_default() {
    let store = FlakyStore::shared();
    store.inner().set("canvas-data", "{\"nodes\":[\"a\"],\"zoom\":2.0}").unwrap();
    store.fail_reads(true);

    let reporter = Arc::new(RecordingReporter::new());
    let slot = DurableSlot::init_with("canvas-data", Canvas::default(), store.clone(), reporter.clone());

    assert_eq!(slot.get(), &Canvas::default());
    assert_eq!(slot.durability(), Durability::Unwritten);
    assert_eq!(reporter.count(DiagnosticKind::ReadFailure), 1);
    assert_eq!(store.writes(), 0);
}

#[test]
fn file_store_round_trip_across_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let store = Arc::new(FileStore::open(dir.path()).unwrap());
        let mut slot = DurableSlot::init("canvas-data", Canvas::default(), store);
        slot.modify(|canvas| Canvas {
            nodes: vec!["Mira".to_string(), "Harbor".to_string()],
            zoom: canvas.zoom * 1.5,
        });
    }

    let store = Arc::new(FileStore::open(dir.path()).unwrap());
    assert_eq!(store.keys().unwrap(), vec!["canvas-data".to_string()]);

    let slot = DurableSlot::init("canvas-data", Canvas::default(), store);
    assert_eq!(slot.get().nodes, vec!["Mira", "Harbor"]);
    assert_eq!(slot.get().zoom, 1.5);
    assert_eq!(slot.durability(), Durability::Synced);
}

#[test]
fn independent_slots_on_one_key_last_write_wins() {
    let store = Arc::new(MemoryStore::new());
    let mut first = DurableSlot::init("theme", "light".to_string(), store.clone());
    let mut second = DurableSlot::init("theme", "light".to_string(), store.clone());

    first.set("dark".to_string());
    second.set("sepia".to_string());

    // Neither slot re-reads; the store holds whichever wrote last
    assert_eq!(first.get(), "dark");
    assert_eq!(second.get(), "sepia");
    let fresh = DurableSlot::init("theme", String::new(), store);
    assert_eq!(fresh.get(), "sepia");
}

#[test]
fn quota_store_rejects_oversized_value() {
    let store = Arc::new(MemoryStore::with_quota(32));
    let reporter = Arc::new(RecordingReporter::new());
    let mut slot = DurableSlot::init_with("notes", String::new(), store.clone(), reporter.clone());

    slot.set("short".to_string());
    assert_eq!(slot.durability(), Durability::Synced);

    slot.set("x".repeat(64));
    assert_eq!(slot.durability(), Durability::Diverged);
    assert_eq!(slot.get().len(), 64);
    assert_eq!(store.get("notes").unwrap().as_deref(), Some("\"short\""));
    assert_eq!(reporter.failures(), 1);
}

proptest! {
    #[test]
    fn last_update_is_what_reload_sees(values in prop::collection::vec(any::<i64>(), 1..20)) {
        let store = Arc::new(MemoryStore::new());
        let mut slot = DurableSlot::init("n", 0_i64, store.clone());
        for v in &values {
            slot.set(*v);
        }
        let reloaded = DurableSlot::init("n", 0_i64, store);
        prop_assert_eq!(reloaded.get(), values.last().unwrap());
    }
}
