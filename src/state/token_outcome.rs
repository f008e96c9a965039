/// Token outcome definitions
///
/// Every token visited by a sweep ends in exactly one of these states.
use std::fmt;

/// How the work on one search token ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenOutcome {
    // ===== Success States =====
    /// Every result of the token was visited
    Completed,

    /// The search matched nothing; the detail view was never opened
    NoResults,

    // ===== Skip States =====
    /// The search page never became quiescent, or submitting the search failed
    SearchTimeout,

    /// The result count could not be read from the results page
    CountUnreadable,

    /// Navigation failed part way through the result set
    Aborted,

    // ===== Special States =====
    /// The sweep was stopped before this token was visited
    Cancelled,
}

impl TokenOutcome {
    /// All outcomes, in reporting order
    pub const ALL: [TokenOutcome; 6] = [
        TokenOutcome::Completed,
        TokenOutcome::NoResults,
        TokenOutcome::SearchTimeout,
        TokenOutcome::CountUnreadable,
        TokenOutcome::Aborted,
        TokenOutcome::Cancelled,
    ];

    /// Returns true if the token's results were fully visited
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed | Self::NoResults)
    }

    /// Returns true if the token was skipped or cut short by a failure
    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            Self::SearchTimeout | Self::CountUnreadable | Self::Aborted
        )
    }

    /// Converts the outcome to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::NoResults => "no_results",
            Self::SearchTimeout => "search_timeout",
            Self::CountUnreadable => "count_unreadable",
            Self::Aborted => "aborted",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses an outcome from its database string representation
    ///
    /// Returns None if the string doesn't match any known outcome.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "completed" => Some(Self::Completed),
            "no_results" => Some(Self::NoResults),
            "search_timeout" => Some(Self::SearchTimeout),
            "count_unreadable" => Some(Self::CountUnreadable),
            "aborted" => Some(Self::Aborted),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for TokenOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_string_roundtrip() {
        for outcome in TokenOutcome::ALL {
            assert_eq!(
                TokenOutcome::from_db_string(outcome.to_db_string()),
                Some(outcome)
            );
        }
        assert_eq!(TokenOutcome::from_db_string("exploded"), None);
    }

    #[test]
    fn test_classification() {
        assert!(TokenOutcome::Completed.is_success());
        assert!(TokenOutcome::NoResults.is_success());
        assert!(TokenOutcome::Aborted.is_skip());
        assert!(!TokenOutcome::Cancelled.is_skip());
    }
}
