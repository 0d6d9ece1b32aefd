//! In-memory snapshot store.

use std::collections::HashMap;

use super::{DbResult, Slot, SnapshotStore};

/// Snapshot store kept in process memory (tests, previews).
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: HashMap<Slot, String>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of `save` calls.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self, slot: Slot) -> DbResult<Option<String>> {
        Ok(self.slots.get(&slot).cloned())
    }

    fn save(&mut self, slot: Slot, snapshot: &str) -> DbResult<()> {
        self.slots.insert(slot, snapshot.to_string());
        self.writes += 1;
        Ok(())
    }
}
