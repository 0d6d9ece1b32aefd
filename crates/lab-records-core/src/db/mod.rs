//! Snapshot persistence for lab records.
//!
//! Each dataset lives in one named slot and is written whole on every change.

mod memory;
mod schema;
mod snapshots;

pub use memory::*;
pub use schema::*;

use rusqlite::Connection;
use std::path::Path;
use thiserror::Error;

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type DbResult<T> = Result<T, DbError>;

/// Named dataset slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Patients,
    Tests,
    Visits,
    Settings,
}

impl Slot {
    /// Every slot, in load order.
    pub const ALL: [Slot; 4] = [Slot::Patients, Slot::Tests, Slot::Visits, Slot::Settings];

    /// Storage key.
    pub fn key(&self) -> &'static str {
        match self {
            Slot::Patients => "lab_patients",
            Slot::Tests => "lab_tests",
            Slot::Visits => "lab_visits",
            Slot::Settings => "lab_settings",
        }
    }
}

/// Durable mapping from slot to its serialized snapshot.
pub trait SnapshotStore {
    /// Read a slot. `None` if it has never been written.
    fn load(&self, slot: Slot) -> DbResult<Option<String>>;

    /// Overwrite a slot with a new snapshot.
    fn save(&mut self, slot: Slot, snapshot: &str) -> DbResult<()>;
}

/// SQLite-backed snapshot store.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open database at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Initialize schema.
    fn initialize(&self) -> DbResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}
