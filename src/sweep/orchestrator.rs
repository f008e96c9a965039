//! Sweep orchestrator - main crawl-control loop
//!
//! This module drives one sweep over a token range:
//! - Submitting each search token and reading its result count
//! - Walking the detail view record by record
//! - Appending extracted records, writing the header exactly once
//! - Recording token outcomes and skip events in the ledger
//! - Stopping cleanly between tokens when cancelled

use crate::browser::DocumentAccessor;
use crate::config::{validate, Config, SiteConfig};
use crate::output::RecordSink;
use crate::record::{header_row, Record};
use crate::state::{ResultSet, TokenOutcome};
use crate::storage::{RunStatus, Storage};
use crate::sweep::{
    bounded, Extracted, FieldExtractor, PaginationDriver, ResultCountReader, SearchToken, SkipEvent,
    SkipKind, SweepFailure, SweepReport, TokenRange, TokenSummary,
};
use crate::SweepError;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Main sweep orchestration structure
///
/// Borrows the browser session, the record sink and the ledger for the length
/// of one sweep. Only sink and ledger failures end a sweep early; every
/// navigation or extraction failure is recorded and skipped.
pub struct Orchestrator<'a, A, S, St>
where
    A: DocumentAccessor,
    S: RecordSink,
    St: Storage,
{
    accessor: &'a mut A,
    sink: &'a mut S,
    storage: &'a mut St,
    site: SiteConfig,
    step_timeout: Duration,
    detail_timeout: Duration,
    extractor: FieldExtractor,
    counter: ResultCountReader,
    pagination: PaginationDriver,
    config_hash: String,
    cancel: CancellationToken,
    header_written: bool,
}

impl<'a, A, S, St> Orchestrator<'a, A, S, St>
where
    A: DocumentAccessor,
    S: RecordSink,
    St: Storage,
{
    /// Creates a new orchestrator
    ///
    /// # Arguments
    ///
    /// * `config` - The sweep configuration
    /// * `accessor` - The browser session to drive
    /// * `sink` - Destination for extracted records
    /// * `storage` - Ledger for runs, outcomes and skip events
    ///
    /// # Returns
    ///
    /// * `Ok(Orchestrator)` - Ready to run
    /// * `Err(SweepError)` - The configuration is invalid
    pub fn new(
        config: &Config,
        accessor: &'a mut A,
        sink: &'a mut S,
        storage: &'a mut St,
    ) -> Result<Self, SweepError> {
        validate(config)?;

        let step_timeout = config.sweep.step_timeout();

        Ok(Self {
            accessor,
            sink,
            storage,
            site: config.site.clone(),
            step_timeout,
            detail_timeout: config.sweep.detail_timeout(),
            extractor: FieldExtractor::detail_page()?,
            counter: ResultCountReader::new(&config.site.result_count)?,
            pagination: PaginationDriver::new(config.site.next_record.clone(), step_timeout),
            config_hash: String::new(),
            cancel: CancellationToken::new(),
            header_written: false,
        })
    }

    /// Sets the configuration hash stored with the run
    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = hash.into();
        self
    }

    /// Sets the token that stops the sweep between search tokens
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Runs the sweep over `range`
    ///
    /// Creates a run in the ledger, visits every token of the range in order
    /// and marks the run `completed`, or `interrupted` if cancelled. A fatal
    /// error marks the run `failed` before it is returned.
    pub async fn run(&mut self, range: TokenRange) -> Result<SweepReport, SweepError> {
        self.header_written = self.sink.has_data()?;
        if self.header_written {
            tracing::info!("Output already holds rows, appending without a header");
        }

        let run_id = self.storage.create_run(&self.config_hash)?;
        let mut report = SweepReport::new(run_id);
        tracing::info!("Starting sweep run {} over tokens {}", run_id, range);

        if let Err(e) = self.sweep_range(range, &mut report).await {
            tracing::error!("Sweep run {} failed: {}", run_id, e);
            if let Err(status_err) = self.storage.update_run_status(run_id, RunStatus::Failed) {
                tracing::warn!("Could not mark run {} as failed: {}", run_id, status_err);
            }
            return Err(e);
        }

        if report.cancelled {
            self.storage
                .update_run_status(run_id, RunStatus::Interrupted)?;
            tracing::warn!(
                "Sweep run {} interrupted after {} records",
                run_id,
                report.records_written
            );
        } else {
            self.storage.complete_run(run_id)?;
            tracing::info!(
                "Sweep run {} completed: {} records from {} tokens",
                run_id,
                report.records_written,
                report.tokens.len()
            );
        }

        Ok(report)
    }

    async fn sweep_range(
        &mut self,
        range: TokenRange,
        report: &mut SweepReport,
    ) -> Result<(), SweepError> {
        let start_time = Instant::now();
        let total_tokens = range.len();
        let mut tokens = range.iter();

        while let Some(token) = tokens.next() {
            if self.cancel.is_cancelled() {
                tracing::warn!("Sweep cancelled before token {}", token);
                for skipped in std::iter::once(token).chain(tokens.by_ref()) {
                    let summary = TokenSummary {
                        token: skipped,
                        outcome: TokenOutcome::Cancelled,
                        total: None,
                        records_written: 0,
                        message: Some("sweep cancelled".to_string()),
                    };
                    self.storage.record_token_outcome(report.run_id, &summary)?;
                    report.tokens.push(summary);
                }
                report.cancelled = true;
                break;
            }

            let summary = self.sweep_token(token, report).await?;
            self.storage.record_token_outcome(report.run_id, &summary)?;
            report.records_written += summary.records_written;
            report.tokens.push(summary);

            let elapsed = start_time.elapsed().as_secs_f64();
            let rate = if elapsed > 0.0 {
                report.records_written as f64 * 60.0 / elapsed
            } else {
                0.0
            };
            tracing::info!(
                "Progress: {}/{} tokens, {} records written, {:.1} records/min",
                report.tokens.len(),
                total_tokens,
                report.records_written,
                rate
            );
        }

        Ok(())
    }

    /// Visits every result of one search token
    ///
    /// Only sink and ledger failures are returned as errors; everything else
    /// ends up in the token's outcome.
    async fn sweep_token(
        &mut self,
        token: SearchToken,
        report: &mut SweepReport,
    ) -> Result<TokenSummary, SweepError> {
        tracing::info!("Searching token {}", token);

        if let Err(failure) = self.submit_search(token).await {
            let message = failure.to_string();
            self.skip(report, SkipEvent::token(token, failure.kind(), &message))?;
            return Ok(summary(token, TokenOutcome::SearchTimeout, None, 0, Some(message)));
        }

        let total = match self.read_count().await {
            Ok(total) => total,
            Err(failure) => {
                let message = failure.to_string();
                self.skip(report, SkipEvent::token(token, failure.kind(), &message))?;
                return Ok(summary(token, TokenOutcome::CountUnreadable, None, 0, Some(message)));
            }
        };

        if total == 0 {
            tracing::info!("Token {} matched no records", token);
            return Ok(summary(token, TokenOutcome::NoResults, Some(0), 0, None));
        }
        tracing::info!("Token {} matched {} records", token, total);

        if let Err(failure) = bounded(
            self.step_timeout,
            "opening first result",
            self.accessor.click(&self.site.first_result),
        )
        .await
        {
            let message = failure.to_string();
            self.skip(report, SkipEvent::record(token, 0, failure.kind(), &message))?;
            return Ok(summary(token, TokenOutcome::Aborted, Some(total), 0, Some(message)));
        }

        let mut results = ResultSet::new(total);
        let mut written = 0;

        while !results.is_exhausted() {
            let position = results.cursor();

            if let Err(e) = self
                .accessor
                .wait_for_selector(&self.site.ready_landmark, self.detail_timeout)
                .await
            {
                let message = format!("detail page {} never became ready: {}", position + 1, e);
                self.skip(
                    report,
                    SkipEvent::record(token, position, SkipKind::NavigationTimeout, &message),
                )?;
                return Ok(summary(token, TokenOutcome::Aborted, Some(total), written, Some(message)));
            }

            match self.extract_current().await {
                Ok(extracted) => {
                    for field in &extracted.defaulted {
                        self.skip(
                            report,
                            SkipEvent::record(
                                token,
                                position,
                                SkipKind::DefaultedField,
                                "field not found, written as empty",
                            )
                            .with_field(*field),
                        )?;
                    }
                    self.append(&extracted.record)?;
                    written += 1;
                }
                Err(failure) => {
                    let mut event =
                        SkipEvent::record(token, position, failure.kind(), failure.to_string());
                    if let SweepFailure::IdentityMissing(field) = failure {
                        event = event.with_field(field);
                    }
                    self.skip(report, event)?;
                }
            }

            if !results.is_last() {
                if let Err(failure) = self.pagination.advance(&mut *self.accessor).await {
                    let message = failure.to_string();
                    self.skip(
                        report,
                        SkipEvent::record(token, position, failure.kind(), &message),
                    )?;
                    return Ok(summary(token, TokenOutcome::Aborted, Some(total), written, Some(message)));
                }
            }
            results.advance();
        }

        Ok(summary(token, TokenOutcome::Completed, Some(total), written, None))
    }

    /// Loads the entry page and submits `token`
    async fn submit_search(&mut self, token: SearchToken) -> Result<(), SweepFailure> {
        let step = self.step_timeout;
        let query = token.to_string();

        bounded(step, "loading search page", self.accessor.open(&self.site.url)).await?;
        bounded(
            step,
            "filling search field",
            self.accessor.fill(&self.site.search_field, &query),
        )
        .await?;
        bounded(
            step,
            "submitting search",
            self.accessor.click(&self.site.search_button),
        )
        .await?;

        self.accessor
            .wait_for_idle(step)
            .await
            .map_err(|e| SweepFailure::NavigationTimeout(format!("waiting for results: {}", e)))
    }

    async fn read_count(&mut self) -> Result<usize, SweepFailure> {
        let document = self
            .accessor
            .current_document()
            .await
            .map_err(|e| SweepFailure::ParseFailure {
                what: "results page".to_string(),
                reason: e.to_string(),
            })?;
        self.counter.read(&document)
    }

    async fn extract_current(&mut self) -> Result<Extracted, SweepFailure> {
        let document = self
            .accessor
            .current_document()
            .await
            .map_err(|e| SweepFailure::ParseFailure {
                what: "detail page".to_string(),
                reason: e.to_string(),
            })?;
        self.extractor.extract(&document)
    }

    /// Appends a record, writing the header first if this is the first row
    fn append(&mut self, record: &Record) -> Result<(), SweepError> {
        if !self.header_written {
            self.sink.write_header(&header_row())?;
            self.header_written = true;
            tracing::debug!("Wrote header row");
        }
        self.sink.append(record)?;
        tracing::debug!(
            "Appended record {} / {}",
            record.property_id(),
            record.geo_id()
        );
        Ok(())
    }

    /// Logs a skip event and records it in the ledger and the report
    fn skip(&mut self, report: &mut SweepReport, event: SkipEvent) -> Result<(), SweepError> {
        let position = event
            .position
            .map(|p| format!(" record {}", p + 1))
            .unwrap_or_default();
        match event.kind {
            SkipKind::DefaultedField => tracing::debug!(
                "Token {}{}: field '{}' defaulted to empty",
                event.token,
                position,
                event.field.map(|f| f.header()).unwrap_or("?")
            ),
            kind => tracing::warn!("Token {}{}: {} ({})", event.token, position, event.message, kind),
        }

        self.storage.record_skip(report.run_id, &event)?;
        report.skips.push(event);
        Ok(())
    }
}

fn summary(
    token: SearchToken,
    outcome: TokenOutcome,
    total: Option<usize>,
    records_written: usize,
    message: Option<String>,
) -> TokenSummary {
    TokenSummary {
        token,
        outcome,
        total,
        records_written,
        message,
    }
}

/// Runs a complete sweep over `range`
///
/// This is the main entry point for sweeping without cancellation:
///
/// 1. Create a run in the ledger
/// 2. For each token: search, read the count, walk the detail view
/// 3. Append each readable record, header first
/// 4. Record outcomes and skip events
/// 5. Mark the run completed
///
/// # Example
///
/// ```no_run
/// use parcel_sweep::browser::ChromiumAccessor;
/// use parcel_sweep::output::CsvSink;
/// use parcel_sweep::storage::SqliteStorage;
/// use parcel_sweep::{run_sweep, Config};
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Config::default();
/// let mut accessor = ChromiumAccessor::launch(&config.browser).await?;
/// let mut sink = CsvSink::open(Path::new(&config.output.csv_path))?;
/// let mut storage = SqliteStorage::new(Path::new(&config.output.database_path))?;
/// let range = config.sweep.token_range()?;
///
/// let report = run_sweep(&config, range, &mut accessor, &mut sink, &mut storage).await?;
/// println!("{} records written", report.records_written);
/// # Ok(())
/// # }
/// ```
pub async fn run_sweep<A, S, St>(
    config: &Config,
    range: TokenRange,
    accessor: &mut A,
    sink: &mut S,
    storage: &mut St,
) -> Result<SweepReport, SweepError>
where
    A: DocumentAccessor,
    S: RecordSink,
    St: Storage,
{
    Orchestrator::new(config, accessor, sink, storage)?
        .run(range)
        .await
}
