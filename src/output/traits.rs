//! Output traits and types
//!
//! This module defines the record sink interface the sweep appends to and the
//! run summary reported after a sweep.

use crate::record::Record;
use crate::storage::{SkipEventRecord, TokenOutcomeRecord};
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Durable destination for extracted records
///
/// Every call must be durable before it returns, so a crash loses at most the
/// record that was in flight.
pub trait RecordSink {
    /// Returns true if the destination already holds rows
    ///
    /// A sweep appending to a non-empty destination does not write the header
    /// again.
    fn has_data(&self) -> OutputResult<bool>;

    /// Writes the header row
    fn write_header(&mut self, header: &[&str]) -> OutputResult<()>;

    /// Appends one record
    fn append(&mut self, record: &Record) -> OutputResult<()>;
}

/// Summary of one sweep run, built from the ledger
#[derive(Debug, Clone, Default)]
pub struct SweepSummary {
    // Run metadata
    pub run_id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub duration_seconds: Option<u64>,
    pub status: String,
    pub config_hash: String,

    // Overall statistics
    pub records_written: u64,

    // Token outcome breakdown
    pub tokens_completed: u64,
    pub tokens_no_results: u64,
    pub tokens_search_timeout: u64,
    pub tokens_count_unreadable: u64,
    pub tokens_aborted: u64,
    pub tokens_cancelled: u64,

    // Tokens that did not finish cleanly, in visiting order
    pub skipped_tokens: Vec<TokenOutcomeRecord>,

    // Every skip event of the run, in recording order
    pub skip_events: Vec<SkipEventRecord>,
}

impl SweepSummary {
    /// Creates a new empty summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of tokens that were actually visited
    pub fn tokens_visited(&self) -> u64 {
        self.tokens_completed
            + self.tokens_no_results
            + self.tokens_search_timeout
            + self.tokens_count_unreadable
            + self.tokens_aborted
    }

    /// Returns the number of visited tokens that were skipped or cut short
    pub fn tokens_skipped(&self) -> u64 {
        self.tokens_search_timeout + self.tokens_count_unreadable + self.tokens_aborted
    }

    /// Returns the share of visited tokens whose results were fully read, as a percentage
    pub fn coverage_rate(&self) -> f64 {
        let visited = self.tokens_visited();
        if visited == 0 {
            return 0.0;
        }
        ((self.tokens_completed + self.tokens_no_results) as f64 / visited as f64) * 100.0
    }
}
