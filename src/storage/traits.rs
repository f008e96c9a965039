//! Storage traits and error types
//!
//! This module defines the trait interface for the sweep ledger and
//! associated error types.

use crate::state::TokenOutcome;
use crate::storage::{RunRecord, RunStatus, SkipEventRecord, TokenOutcomeRecord};
use crate::sweep::{SearchToken, SkipEvent, TokenSummary};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Unrecognized value in ledger: {0}")]
    InvalidValue(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for sweep ledger implementations
///
/// The ledger records what each run did per token, so an interrupted sweep can
/// be resumed and its gaps reported.
pub trait Storage {
    // ===== Run Management =====

    /// Creates a new sweep run
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration the run was started with
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Updates the status of a run and stamps its finish time
    fn update_run_status(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()>;

    /// Marks a run as completed with a finish timestamp
    fn complete_run(&mut self, run_id: i64) -> StorageResult<()>;

    /// Counts all runs in the ledger
    fn count_runs(&self) -> StorageResult<u64>;

    // ===== Token Outcomes =====

    /// Records how one token ended
    ///
    /// # Arguments
    ///
    /// * `run_id` - The run the token belongs to
    /// * `summary` - The token's outcome, result count and rows written
    fn record_token_outcome(&mut self, run_id: i64, summary: &TokenSummary) -> StorageResult<()>;

    /// Gets all token outcomes of a run, in visiting order
    fn get_token_outcomes(&self, run_id: i64) -> StorageResult<Vec<TokenOutcomeRecord>>;

    /// The most recently finished token of a run or the runs it continues
    ///
    /// Looks back through `run_id` and every earlier run since the last
    /// completed one, so a run that finished nothing still resumes after the
    /// run before it. Cancelled tokens do not count as finished. A resumed
    /// sweep starts at the token after this one.
    fn last_finished_token(&self, run_id: i64) -> StorageResult<Option<SearchToken>>;

    /// Counts a run's tokens by outcome
    fn count_outcomes(&self, run_id: i64) -> StorageResult<HashMap<TokenOutcome, u64>>;

    /// Total rows a run appended to the output store
    fn count_records_written(&self, run_id: i64) -> StorageResult<u64>;

    // ===== Skip Events =====

    /// Records one skip event
    fn record_skip(&mut self, run_id: i64, event: &SkipEvent) -> StorageResult<()>;

    /// Gets all skip events of a run, in recording order
    fn get_skip_events(&self, run_id: i64) -> StorageResult<Vec<SkipEventRecord>>;
}
