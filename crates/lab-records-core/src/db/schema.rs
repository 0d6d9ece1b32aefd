//! SQLite schema definition.

/// Complete database schema for lab records.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Dataset Snapshots (one row per slot, overwritten whole)
-- ============================================================================

CREATE TABLE IF NOT EXISTS snapshots (
    slot TEXT PRIMARY KEY CHECK (slot IN ('lab_patients', 'lab_tests', 'lab_visits', 'lab_settings')),
    payload TEXT NOT NULL,                       -- JSON snapshot of the dataset
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;
