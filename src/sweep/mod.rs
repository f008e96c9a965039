//! Sweep module: the crawl-control core
//!
//! This module contains everything that drives one sweep over the index:
//! - Search token enumeration
//! - Result count reading
//! - Field extraction from detail pages
//! - Record-to-record pagination
//! - Overall orchestration, skip reporting and cancellation

mod count;
mod enumerator;
mod extractor;
mod orchestrator;
mod pagination;
mod report;
mod resume;

pub use count::ResultCountReader;
pub use enumerator::{SearchToken, TokenRange, Tokens, ALPHABET};
pub use extractor::{Extracted, FieldExtractor, FieldRead, DETAIL_PAGE_LOCATIONS};
pub use orchestrator::{run_sweep, Orchestrator};
pub use pagination::PaginationDriver;
pub use report::{SkipEvent, SkipKind, SweepReport, TokenSummary};
pub use resume::resume_range;

use crate::browser::AccessorResult;
use crate::record::Field;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Recoverable failures inside a sweep
///
/// Each one is caught at the narrowest scope that can continue: a field, a
/// record, or a token. None of them stop the sweep.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SweepFailure {
    #[error("Could not read {what}: {reason}")]
    ParseFailure { what: String, reason: String },

    #[error("Navigation timed out: {0}")]
    NavigationTimeout(String),

    #[error("Identity field '{0}' missing")]
    IdentityMissing(Field),
}

impl SweepFailure {
    /// The skip report category of this failure
    pub fn kind(&self) -> SkipKind {
        match self {
            Self::ParseFailure { .. } => SkipKind::ParseFailure,
            Self::NavigationTimeout(_) => SkipKind::NavigationTimeout,
            Self::IdentityMissing(_) => SkipKind::IdentityMissing,
        }
    }
}

/// Bounds an accessor step by `limit`, folding any failure into a navigation timeout
pub(crate) async fn bounded<T, F>(limit: Duration, what: &str, step: F) -> Result<T, SweepFailure>
where
    F: Future<Output = AccessorResult<T>>,
{
    match tokio::time::timeout(limit, step).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(SweepFailure::NavigationTimeout(format!("{}: {}", what, e))),
        Err(_) => Err(SweepFailure::NavigationTimeout(format!(
            "{}: no response after {:?}",
            what, limit
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::AccessorError;

    #[test]
    fn test_failure_kind() {
        let parse = SweepFailure::ParseFailure {
            what: "result count".to_string(),
            reason: "no number".to_string(),
        };
        assert_eq!(parse.kind(), SkipKind::ParseFailure);
        assert_eq!(
            SweepFailure::NavigationTimeout("next record".to_string()).kind(),
            SkipKind::NavigationTimeout
        );
        assert_eq!(
            SweepFailure::IdentityMissing(Field::GeoId).kind(),
            SkipKind::IdentityMissing
        );
    }

    #[test]
    fn test_failure_display() {
        let err = SweepFailure::IdentityMissing(Field::PropertyId);
        assert_eq!(err.to_string(), "Identity field 'Property ID' missing");
    }

    #[tokio::test]
    async fn test_bounded_passes_value_through() {
        let value = bounded(Duration::from_millis(50), "step", async { Ok::<_, AccessorError>(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_bounded_maps_accessor_error() {
        let err = bounded(Duration::from_millis(50), "submitting search", async {
            Err::<(), _>(AccessorError::Browser("detached".to_string()))
        })
        .await
        .unwrap_err();
        assert_eq!(
            err,
            SweepFailure::NavigationTimeout("submitting search: Browser error: detached".to_string())
        );
    }

    #[tokio::test]
    async fn test_bounded_times_out_stalled_step() {
        let err = bounded(Duration::from_millis(10), "loading search page", async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<(), AccessorError>(())
        })
        .await
        .unwrap_err();
        assert!(matches!(err, SweepFailure::NavigationTimeout(m) if m.starts_with("loading search page")));
    }
}
