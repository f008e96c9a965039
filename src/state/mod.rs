//! State module for tracking sweep progress
//!
//! This module provides the state carried while one search token is being
//! worked and the terminal classification each token ends up in.
//!
//! # Components
//!
//! - `ResultSet`: count and cursor for the records matching one token
//! - `TokenOutcome`: how the work on one token ended

mod result_set;
mod token_outcome;

// Re-export main types
pub use result_set::ResultSet;
pub use token_outcome::TokenOutcome;
