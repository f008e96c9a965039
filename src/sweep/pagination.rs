//! Record-to-record navigation inside the detail view

use crate::browser::{DocumentAccessor, Locator};
use crate::sweep::{bounded, SweepFailure};
use std::time::Duration;

/// Moves the detail view from record i to record i+1
#[derive(Debug, Clone)]
pub struct PaginationDriver {
    next_record: Locator,
    step_timeout: Duration,
}

impl PaginationDriver {
    pub fn new(next_record: Locator, step_timeout: Duration) -> Self {
        Self {
            next_record,
            step_timeout,
        }
    }

    /// Clicks the next-record control once it is present
    ///
    /// Returns as soon as the click is issued. Waiting for the next record to
    /// render is the caller's job.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The click was dispatched
    /// * `Err(SweepFailure::NavigationTimeout)` - The control never appeared
    ///   within the step bound, or the click failed or did not return within it
    pub async fn advance<A>(&self, accessor: &mut A) -> Result<(), SweepFailure>
    where
        A: DocumentAccessor + ?Sized,
    {
        accessor
            .wait_for_selector(&self.next_record, self.step_timeout)
            .await
            .map_err(|e| SweepFailure::NavigationTimeout(format!("next record control: {}", e)))?;

        bounded(
            self.step_timeout,
            "clicking next record",
            accessor.click(&self.next_record),
        )
        .await?;

        tracing::debug!("Advanced to next record");
        Ok(())
    }
}
