//! Parcel-Sweep: an exhaustive property-record sweeper
//!
//! This crate drives a headless browser session through a search-driven
//! property index, one search token at a time, and appends every record it
//! can read to an append-only CSV file.

pub mod browser;
pub mod config;
pub mod document;
pub mod output;
pub mod record;
pub mod state;
pub mod storage;
pub mod sweep;

use thiserror::Error;

/// Main error type for Parcel-Sweep operations
///
/// Only failures that make the sweep itself impossible surface here. Per-token
/// and per-record failures are handled inside the orchestrator.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Browser error: {0}")]
    Browser(#[from] browser::AccessorError),

    #[error("Browser launch failed: {0}")]
    Launch(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    StorageError(#[from] storage::StorageError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid search token: {0}")]
    InvalidToken(String),
}

/// Result type alias for Parcel-Sweep operations
pub type Result<T> = std::result::Result<T, SweepError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use record::{Field, Record};
pub use state::{ResultSet, TokenOutcome};
pub use sweep::{run_sweep, SearchToken, SweepReport, TokenRange};
