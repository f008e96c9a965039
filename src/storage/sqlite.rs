//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::state::TokenOutcome;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{RunRecord, RunStatus, SkipEventRecord, TokenOutcomeRecord};
use crate::sweep::{SearchToken, SkipEvent, SkipKind, TokenSummary};
use crate::SweepError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(SweepError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, SweepError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database, used by tests and dry runs
    pub fn new_in_memory() -> Result<Self, SweepError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(4)?).unwrap_or(RunStatus::Running),
    })
}

impl Storage for SqliteStorage {
    // ===== Run Management =====

    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.conn
            .query_row(
                "SELECT id, started_at, finished_at, config_hash, status FROM runs WHERE id = ?1",
                params![run_id],
                run_from_row,
            )
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                "SELECT id, started_at, finished_at, config_hash, status FROM runs ORDER BY id DESC LIMIT 1",
                [],
                run_from_row,
            )
            .optional()?;

        Ok(run)
    }

    fn update_run_status(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2 WHERE id = ?3",
            params![status.to_db_string(), now, run_id],
        )?;
        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn complete_run(&mut self, run_id: i64) -> StorageResult<()> {
        self.update_run_status(run_id, RunStatus::Completed)
    }

    fn count_runs(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM runs", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    // ===== Token Outcomes =====

    fn record_token_outcome(&mut self, run_id: i64, summary: &TokenSummary) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO token_outcomes
             (run_id, token, outcome, total, records_written, message, finished_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                run_id,
                summary.token.to_string(),
                summary.outcome.to_db_string(),
                summary.total.map(|t| t as i64),
                summary.records_written as i64,
                summary.message,
                now,
            ],
        )?;
        Ok(())
    }

    fn get_token_outcomes(&self, run_id: i64) -> StorageResult<Vec<TokenOutcomeRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT run_id, token, outcome, total, records_written, message, finished_at
             FROM token_outcomes WHERE run_id = ?1 ORDER BY id",
        )?;

        let rows = stmt
            .query_map(params![run_id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<i64>>(3)?,
                    row.get::<_, i64>(4)?,
                    row.get::<_, Option<String>>(5)?,
                    row.get::<_, String>(6)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(
                |(run_id, token, outcome, total, records_written, message, finished_at)| {
                    let outcome = TokenOutcome::from_db_string(&outcome)
                        .ok_or_else(|| StorageError::InvalidValue(format!("outcome '{}'", outcome)))?;
                    Ok(TokenOutcomeRecord {
                        run_id,
                        token,
                        outcome,
                        total: total.map(|t| t as u64),
                        records_written: records_written as u64,
                        message,
                        finished_at,
                    })
                },
            )
            .collect()
    }

    fn last_finished_token(&self, run_id: i64) -> StorageResult<Option<SearchToken>> {
        let token: Option<String> = self
            .conn
            .query_row(
                "SELECT token FROM token_outcomes
                 WHERE run_id <= ?1
                   AND run_id > (SELECT COALESCE(MAX(id), 0) FROM runs
                                 WHERE status = ?2 AND id < ?1)
                   AND outcome != ?3
                 ORDER BY id DESC LIMIT 1",
                params![
                    run_id,
                    RunStatus::Completed.to_db_string(),
                    TokenOutcome::Cancelled.to_db_string()
                ],
                |row| row.get(0),
            )
            .optional()?;

        token
            .map(|t| {
                t.parse::<SearchToken>()
                    .map_err(|_| StorageError::InvalidValue(format!("token '{}'", t)))
            })
            .transpose()
    }

    fn count_outcomes(&self, run_id: i64) -> StorageResult<HashMap<TokenOutcome, u64>> {
        let mut stmt = self.conn.prepare(
            "SELECT outcome, COUNT(*) FROM token_outcomes WHERE run_id = ?1 GROUP BY outcome",
        )?;

        let mut counts = HashMap::new();
        let rows = stmt.query_map(params![run_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        for row in rows {
            let (outcome_str, count) = row?;
            if let Some(outcome) = TokenOutcome::from_db_string(&outcome_str) {
                counts.insert(outcome, count as u64);
            }
        }

        Ok(counts)
    }

    fn count_records_written(&self, run_id: i64) -> StorageResult<u64> {
        let total: i64 = self.conn.query_row(
            "SELECT COALESCE(SUM(records_written), 0) FROM token_outcomes WHERE run_id = ?1",
            params![run_id],
            |row| row.get(0),
        )?;
        Ok(total as u64)
    }

    // ===== Skip Events =====

    fn record_skip(&mut self, run_id: i64, event: &SkipEvent) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO skip_events (run_id, token, position, kind, field, message, recorded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                run_id,
                event.token.to_string(),
                event.position.map(|p| p as i64),
                event.kind.to_db_string(),
                event.field.map(|f| f.header()),
                event.message,
                now,
            ],
        )?;
        Ok(())
    }

    fn get_skip_events(&self, run_id: i64) -> StorageResult<Vec<SkipEventRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT run_id, token, position, kind, field, message, recorded_at
             FROM skip_events WHERE run_id = ?1 ORDER BY id",
        )?;

        let rows = stmt
            .query_map(params![run_id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<i64>>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, String>(6)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(run_id, token, position, kind, field, message, recorded_at)| {
                let kind = SkipKind::from_db_string(&kind)
                    .ok_or_else(|| StorageError::InvalidValue(format!("skip kind '{}'", kind)))?;
                Ok(SkipEventRecord {
                    run_id,
                    token,
                    position: position.map(|p| p as u64),
                    kind,
                    field,
                    message,
                    recorded_at,
                })
            })
            .collect()
    }
}
