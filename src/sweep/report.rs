//! Skip report types
//!
//! A sweep never stops on a bad token or record; instead it records what it
//! skipped so the gaps can be audited afterwards.

use crate::record::Field;
use crate::state::TokenOutcome;
use crate::sweep::SearchToken;
use std::fmt;

/// Category of a skip event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipKind {
    /// A count or page could not be read
    ParseFailure,
    /// A wait or navigation step ran out of time
    NavigationTimeout,
    /// A record had no Property ID or Geo ID
    IdentityMissing,
    /// A non-identity field was absent and written as empty
    DefaultedField,
}

impl SkipKind {
    pub const ALL: [SkipKind; 4] = [
        SkipKind::ParseFailure,
        SkipKind::NavigationTimeout,
        SkipKind::IdentityMissing,
        SkipKind::DefaultedField,
    ];

    /// Converts the kind to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::ParseFailure => "parse_failure",
            Self::NavigationTimeout => "navigation_timeout",
            Self::IdentityMissing => "identity_missing",
            Self::DefaultedField => "defaulted_field",
        }
    }

    /// Parses a kind from its database string representation
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "parse_failure" => Some(Self::ParseFailure),
            "navigation_timeout" => Some(Self::NavigationTimeout),
            "identity_missing" => Some(Self::IdentityMissing),
            "defaulted_field" => Some(Self::DefaultedField),
            _ => None,
        }
    }
}

impl fmt::Display for SkipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_string())
    }
}

/// One structured diagnostic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipEvent {
    pub token: SearchToken,
    /// 0-based record position within the token's result set, if any
    pub position: Option<usize>,
    pub kind: SkipKind,
    pub field: Option<Field>,
    pub message: String,
}

impl SkipEvent {
    /// A skip that applies to the whole token
    pub fn token(token: SearchToken, kind: SkipKind, message: impl Into<String>) -> Self {
        Self {
            token,
            position: None,
            kind,
            field: None,
            message: message.into(),
        }
    }

    /// A skip that applies to one record of the token
    pub fn record(
        token: SearchToken,
        position: usize,
        kind: SkipKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            token,
            position: Some(position),
            kind,
            field: None,
            message: message.into(),
        }
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.field = Some(field);
        self
    }
}

/// How one token ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSummary {
    pub token: SearchToken,
    pub outcome: TokenOutcome,
    /// Result count, when it could be read
    pub total: Option<usize>,
    pub records_written: usize,
    pub message: Option<String>,
}

/// Everything a sweep produced apart from the rows themselves
#[derive(Debug, Clone, Default)]
pub struct SweepReport {
    pub run_id: i64,
    pub records_written: usize,
    pub tokens: Vec<TokenSummary>,
    pub skips: Vec<SkipEvent>,
    pub cancelled: bool,
}

impl SweepReport {
    pub fn new(run_id: i64) -> Self {
        Self {
            run_id,
            ..Self::default()
        }
    }

    /// Number of tokens that ended with `outcome`
    pub fn count_outcome(&self, outcome: TokenOutcome) -> usize {
        self.tokens.iter().filter(|t| t.outcome == outcome).count()
    }

    /// Number of skip events of `kind`
    pub fn count_skips(&self, kind: SkipKind) -> usize {
        self.skips.iter().filter(|s| s.kind == kind).count()
    }

    /// Tokens that were actually visited, in order
    pub fn visited_tokens(&self) -> Vec<SearchToken> {
        self.tokens
            .iter()
            .filter(|t| t.outcome != TokenOutcome::Cancelled)
            .map(|t| t.token)
            .collect()
    }

    /// Summary for `token`, if it was reached
    pub fn token_summary(&self, token: SearchToken) -> Option<&TokenSummary> {
        self.tokens.iter().find(|t| t.token == token)
    }
}
