//! Statistics generation from the sweep ledger
//!
//! This module provides functionality for extracting and displaying
//! sweep statistics from the storage layer.

use crate::state::TokenOutcome;
use crate::storage::{RunRecord, Storage};
use crate::sweep::SkipKind;
use crate::SweepError;
use std::collections::HashMap;

/// Sweep statistics for the latest run
#[derive(Debug, Clone)]
pub struct SweepStatistics {
    /// Total number of runs in the ledger
    pub total_runs: u64,

    /// The run the statistics describe
    pub run: RunRecord,

    /// Count of tokens by outcome
    pub tokens_by_outcome: HashMap<TokenOutcome, u64>,

    /// Rows appended to the output store
    pub records_written: u64,

    /// Count of skip events by kind
    pub skips_by_kind: HashMap<SkipKind, u64>,
}

impl SweepStatistics {
    /// Number of tokens the run recorded, visited or not
    pub fn total_tokens(&self) -> u64 {
        self.tokens_by_outcome.values().sum()
    }
}

/// Loads statistics for the most recent run
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(Some(SweepStatistics))` - Statistics of the latest run
/// * `Ok(None)` - The ledger holds no runs
/// * `Err(SweepError)` - Failed to query statistics
pub fn load_statistics(storage: &dyn Storage) -> Result<Option<SweepStatistics>, SweepError> {
    let Some(run) = storage.get_latest_run()? else {
        return Ok(None);
    };

    let total_runs = storage.count_runs()?;
    let tokens_by_outcome = storage.count_outcomes(run.id)?;
    let records_written = storage.count_records_written(run.id)?;

    let mut skips_by_kind = HashMap::new();
    for event in storage.get_skip_events(run.id)? {
        *skips_by_kind.entry(event.kind).or_insert(0) += 1;
    }

    Ok(Some(SweepStatistics {
        total_runs,
        run,
        tokens_by_outcome,
        records_written,
        skips_by_kind,
    }))
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &SweepStatistics) {
    println!("=== Sweep Statistics ===\n");

    println!("Overview:");
    println!("  Runs recorded: {}", stats.total_runs);
    println!(
        "  Latest run: #{} ({}), started {}",
        stats.run.id,
        stats.run.status.to_db_string(),
        stats.run.started_at
    );
    println!("  Records written: {}", stats.records_written);
    println!();

    let total = stats.total_tokens();
    println!("Tokens by Outcome:");
    for outcome in TokenOutcome::ALL {
        let count = stats.tokens_by_outcome.get(&outcome).copied().unwrap_or(0);
        if count == 0 {
            continue;
        }
        let percentage = if total > 0 {
            (count as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", outcome, count, percentage);
    }
    println!();

    if !stats.skips_by_kind.is_empty() {
        println!("Skip Events:");
        for kind in SkipKind::ALL {
            if let Some(count) = stats.skips_by_kind.get(&kind) {
                println!("  {}: {}", kind, count);
            }
        }
        println!();
    }

    let finished: u64 = TokenOutcome::ALL
        .iter()
        .filter(|o| o.is_success())
        .filter_map(|o| stats.tokens_by_outcome.get(o))
        .sum();
    println!("Coverage: {} / {} tokens fully read", finished, total);
}
