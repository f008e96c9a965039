//! Storage module for the sweep ledger
//!
//! This module handles all database operations for the sweeper, including:
//! - SQLite database initialization and schema management
//! - Run tracking and resumption support
//! - Per-token outcomes and skip events

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::state::TokenOutcome;
use crate::sweep::SkipKind;
use crate::SweepError;

use std::path::Path;

/// Initializes or opens a ledger database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully initialized storage
/// * `Err(SweepError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> Result<SqliteStorage, SweepError> {
    SqliteStorage::new(path)
}

/// Represents a sweep run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
}

/// Represents one token's row in the ledger
#[derive(Debug, Clone)]
pub struct TokenOutcomeRecord {
    pub run_id: i64,
    pub token: String,
    pub outcome: TokenOutcome,
    pub total: Option<u64>,
    pub records_written: u64,
    pub message: Option<String>,
    pub finished_at: String,
}

/// Represents a stored skip event
#[derive(Debug, Clone)]
pub struct SkipEventRecord {
    pub run_id: i64,
    pub token: String,
    pub position: Option<u64>,
    pub kind: SkipKind,
    pub field: Option<String>,
    pub message: String,
    pub recorded_at: String,
}

/// Status of a sweep run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Interrupted,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Interrupted => "interrupted",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "interrupted" => Some(Self::Interrupted),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Returns true if a sweep stopped in this state can be resumed
    ///
    /// A run still marked `Running` was killed without a chance to update
    /// its status.
    pub fn is_resumable(&self) -> bool {
        matches!(self, Self::Running | Self::Interrupted | Self::Failed)
    }
}
