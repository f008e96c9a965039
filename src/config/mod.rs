//! Configuration module for Parcel-Sweep
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, and layering command-line overrides on top of them.
//!
//! # Example
//!
//! ```no_run
//! use parcel_sweep::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sweep.toml")).unwrap();
//! println!("Sweeping {}", config.site.url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    BrowserConfig, Config, CountStrategy, OutputConfig, ResultCountConfig, SiteConfig,
    SweepConfig, DEFAULT_SITE_URL,
};

// Re-export parser functions
pub use parser::{hash_content, load_config, load_config_with_hash};
pub use validation::validate;

use crate::sweep::{SearchToken, TokenRange};
use crate::ConfigResult;
use std::time::Duration;

/// Settings that may be overridden from the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub site_url: Option<String>,
    pub output_path: Option<String>,
    pub start_token: Option<String>,
    pub end_token: Option<String>,
    pub step_timeout_ms: Option<u64>,
}

impl ConfigOverrides {
    /// Returns true if no override is set
    pub fn is_empty(&self) -> bool {
        self.site_url.is_none()
            && self.output_path.is_none()
            && self.start_token.is_none()
            && self.end_token.is_none()
            && self.step_timeout_ms.is_none()
    }
}

impl Config {
    /// Applies command-line overrides and re-validates the result
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) -> ConfigResult<()> {
        if let Some(url) = &overrides.site_url {
            self.site.url = url.clone();
        }
        if let Some(path) = &overrides.output_path {
            self.output.csv_path = path.clone();
        }
        if let Some(token) = &overrides.start_token {
            self.sweep.start_token = token.clone();
        }
        if let Some(token) = &overrides.end_token {
            self.sweep.end_token = token.clone();
        }
        if let Some(ms) = overrides.step_timeout_ms {
            self.sweep.step_timeout_ms = ms;
        }
        validate(self)
    }
}

impl SweepConfig {
    /// The inclusive token range this sweep covers
    pub fn token_range(&self) -> ConfigResult<TokenRange> {
        let start: SearchToken = self.start_token.parse()?;
        let end: SearchToken = self.end_token.parse()?;
        TokenRange::new(start, end)
    }

    pub fn step_timeout(&self) -> Duration {
        Duration::from_millis(self.step_timeout_ms)
    }

    pub fn detail_timeout(&self) -> Duration {
        Duration::from_millis(self.detail_timeout_ms)
    }
}
