//! Output module for records and sweep reports
//!
//! This module handles:
//! - Appending extracted records to the CSV output store
//! - Generating markdown skip reports of sweep runs
//! - Printing ledger statistics

mod csv_sink;
mod markdown;
pub mod stats;
mod traits;

pub use csv_sink::{write_row, CsvSink};
pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use stats::{load_statistics, print_statistics, SweepStatistics};
pub use traits::{OutputError, OutputResult, RecordSink, SweepSummary};

use crate::state::TokenOutcome;
use crate::storage::Storage;
use crate::SweepError;

/// Builds the summary of the most recent run from storage
///
/// # Arguments
///
/// * `storage` - The ledger containing sweep data
///
/// # Returns
///
/// * `Ok(SweepSummary)` - Successfully generated summary
/// * `Err(SweepError)` - The ledger holds no runs, or could not be read
pub fn generate_summary(storage: &dyn Storage) -> Result<SweepSummary, SweepError> {
    let run = storage
        .get_latest_run()?
        .ok_or_else(|| SweepError::Storage("No sweep runs found in database".to_string()))?;

    let duration_seconds = match (
        run.started_at.parse::<chrono::DateTime<chrono::Utc>>(),
        run.finished_at
            .as_deref()
            .map(|f| f.parse::<chrono::DateTime<chrono::Utc>>()),
    ) {
        (Ok(started), Some(Ok(finished))) => Some((finished - started).num_seconds().max(0) as u64),
        _ => None,
    };

    let counts = storage.count_outcomes(run.id)?;
    let count = |outcome: TokenOutcome| counts.get(&outcome).copied().unwrap_or(0);

    let skipped_tokens = storage
        .get_token_outcomes(run.id)?
        .into_iter()
        .filter(|t| t.outcome.is_skip())
        .collect();

    Ok(SweepSummary {
        run_id: run.id,
        started_at: run.started_at.clone(),
        finished_at: run.finished_at.clone(),
        duration_seconds,
        status: run.status.to_db_string().to_string(),
        config_hash: run.config_hash.clone(),
        records_written: storage.count_records_written(run.id)?,
        tokens_completed: count(TokenOutcome::Completed),
        tokens_no_results: count(TokenOutcome::NoResults),
        tokens_search_timeout: count(TokenOutcome::SearchTimeout),
        tokens_count_unreadable: count(TokenOutcome::CountUnreadable),
        tokens_aborted: count(TokenOutcome::Aborted),
        tokens_cancelled: count(TokenOutcome::Cancelled),
        skipped_tokens,
        skip_events: storage.get_skip_events(run.id)?,
    })
}
