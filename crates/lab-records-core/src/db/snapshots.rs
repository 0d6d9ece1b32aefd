//! Snapshot read/write on SQLite.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbResult, Slot, SnapshotStore};

impl SnapshotStore for Database {
    fn load(&self, slot: Slot) -> DbResult<Option<String>> {
        self.conn
            .query_row(
                "SELECT payload FROM snapshots WHERE slot = ?",
                [slot.key()],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }

    fn save(&mut self, slot: Slot, snapshot: &str) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO snapshots (slot, payload, updated_at)
            VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(slot) DO UPDATE SET
                payload = excluded.payload,
                updated_at = datetime('now')
            "#,
            params![slot.key(), snapshot],
        )?;
        tracing::debug!(slot = slot.key(), bytes = snapshot.len(), "Snapshot written");
        Ok(())
    }
}

impl Database {
    /// Last write time of a slot (SQLite `datetime('now')` format).
    pub fn slot_updated_at(&self, slot: Slot) -> DbResult<Option<String>> {
        self.conn
            .query_row(
                "SELECT updated_at FROM snapshots WHERE slot = ?",
                [slot.key()],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }
}
