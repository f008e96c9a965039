//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the sweep ledger.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track sweep runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL
);

-- How each search token ended, one row per token per run
CREATE TABLE IF NOT EXISTS token_outcomes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    token TEXT NOT NULL,
    outcome TEXT NOT NULL,
    total INTEGER,
    records_written INTEGER NOT NULL DEFAULT 0,
    message TEXT,
    finished_at TEXT NOT NULL,
    UNIQUE(run_id, token)
);

CREATE INDEX IF NOT EXISTS idx_token_outcomes_run ON token_outcomes(run_id);
CREATE INDEX IF NOT EXISTS idx_token_outcomes_outcome ON token_outcomes(outcome);

-- Skipped tokens, skipped records and defaulted fields
CREATE TABLE IF NOT EXISTS skip_events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    token TEXT NOT NULL,
    position INTEGER,
    kind TEXT NOT NULL,
    field TEXT,
    message TEXT NOT NULL,
    recorded_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_skip_events_run ON skip_events(run_id);
CREATE INDEX IF NOT EXISTS idx_skip_events_kind ON skip_events(kind);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
