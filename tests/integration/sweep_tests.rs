//! Integration tests for the sweep
//!
//! These tests drive the orchestrator against an in-memory scripted index
//! that implements `DocumentAccessor`, and check the CSV output and the
//! ledger end-to-end.

use async_trait::async_trait;
use parcel_sweep::browser::{AccessorError, AccessorResult, DocumentAccessor, Locator};
use parcel_sweep::config::{Config, SiteConfig};
use parcel_sweep::document::Document;
use parcel_sweep::output::CsvSink;
use parcel_sweep::storage::{RunStatus, SqliteStorage, Storage};
use parcel_sweep::sweep::{
    resume_range, Orchestrator, SearchToken, SkipKind, SweepReport, TokenRange,
};
use parcel_sweep::{run_sweep, Field, TokenOutcome};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const ENTRY_PAGE: &str = r#"<html><body>
    <input id="searchHeaderX_searchname" type="text">
    <input type="submit" value="Search">
</body></html>"#;

/// What the results page shows for one token
#[derive(Clone)]
enum Results {
    /// A grid with a header row and one row per detail page
    Grid,
    /// A page without the results container
    Garbled,
}

/// Scripted behaviour of one search token
#[derive(Clone)]
struct TokenScript {
    results: Results,
    details: Vec<String>,
    /// The next-record control never appears on this 0-based record
    stall_at: Option<usize>,
    /// This 0-based detail page never shows its ready landmark
    stall_ready_at: Option<usize>,
    /// The first result link cannot be clicked
    first_result_missing: bool,
    /// Submitting the search fails
    search_fails: bool,
}

impl TokenScript {
    fn records(token: char, count: usize) -> Self {
        Self {
            results: Results::Grid,
            details: (0..count).map(|i| detail_page(token, i)).collect(),
            stall_at: None,
            stall_ready_at: None,
            first_result_missing: false,
            search_fails: false,
        }
    }

    fn garbled() -> Self {
        Self {
            results: Results::Garbled,
            details: Vec::new(),
            stall_at: None,
            stall_ready_at: None,
            first_result_missing: false,
            search_fails: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Blank,
    Entry,
    Results(char),
    Detail(char, usize),
}

/// In-memory stand-in for the property index
///
/// Like the real postback pages, a click only takes effect once the next wait
/// lets the new page load; until then the old page is still shown.
struct ScriptedSite {
    site: SiteConfig,
    scripts: HashMap<char, TokenScript>,
    view: View,
    pending: Option<View>,
    stale_reads: usize,
    typed: String,
    searches: Vec<char>,
    detail_opens: Vec<char>,
    cancel_after_search: Option<(char, CancellationToken)>,
}

impl ScriptedSite {
    fn new() -> Self {
        Self {
            site: SiteConfig::default(),
            scripts: HashMap::new(),
            view: View::Blank,
            pending: None,
            stale_reads: 0,
            typed: String::new(),
            searches: Vec::new(),
            detail_opens: Vec::new(),
            cancel_after_search: None,
        }
    }

    fn with(mut self, token: char, script: TokenScript) -> Self {
        self.scripts.insert(token, script);
        self
    }

    fn script(&self, token: char) -> TokenScript {
        self.scripts
            .get(&token)
            .cloned()
            .unwrap_or_else(|| TokenScript::records(token, 0))
    }

    fn settle(&mut self) {
        if let Some(view) = self.pending.take() {
            self.view = view;
        }
    }

    fn timeout(target: &Locator, waited: Duration) -> AccessorError {
        AccessorError::Timeout {
            what: target.to_string(),
            waited,
        }
    }
}

#[async_trait]
impl DocumentAccessor for ScriptedSite {
    async fn open(&mut self, _url: &str) -> AccessorResult<()> {
        self.view = View::Entry;
        self.pending = None;
        self.typed.clear();
        Ok(())
    }

    async fn fill(&mut self, target: &Locator, text: &str) -> AccessorResult<()> {
        if self.view != View::Entry || *target != self.site.search_field {
            return Err(AccessorError::NotFound(target.clone()));
        }
        self.typed = text.to_string();
        Ok(())
    }

    async fn click(&mut self, target: &Locator) -> AccessorResult<()> {
        match self.view {
            View::Entry if *target == self.site.search_button => {
                let token = self.typed.chars().next().unwrap();
                self.searches.push(token);
                if let Some((on, cancel)) = &self.cancel_after_search {
                    if *on == token {
                        cancel.cancel();
                    }
                }
                if self.script(token).search_fails {
                    return Err(AccessorError::Browser("navigation failed".to_string()));
                }
                self.pending = Some(View::Results(token));
                Ok(())
            }
            View::Results(token) if *target == self.site.first_result => {
                let script = self.script(token);
                if script.details.is_empty() || script.first_result_missing {
                    return Err(AccessorError::NotFound(target.clone()));
                }
                self.detail_opens.push(token);
                self.pending = Some(View::Detail(token, 0));
                Ok(())
            }
            View::Detail(token, i) if *target == self.site.next_record => {
                if i + 1 >= self.script(token).details.len() {
                    return Err(AccessorError::NotFound(target.clone()));
                }
                self.pending = Some(View::Detail(token, i + 1));
                Ok(())
            }
            _ => Err(AccessorError::NotFound(target.clone())),
        }
    }

    async fn wait_for_idle(&mut self, _timeout: Duration) -> AccessorResult<()> {
        self.settle();
        Ok(())
    }

    async fn wait_for_selector(&mut self, target: &Locator, timeout: Duration) -> AccessorResult<()> {
        self.settle();
        match self.view {
            View::Detail(token, i) if *target == self.site.ready_landmark => {
                if self.script(token).stall_ready_at == Some(i) {
                    Err(Self::timeout(target, timeout))
                } else {
                    Ok(())
                }
            }
            View::Detail(token, i) if *target == self.site.next_record => {
                let script = self.script(token);
                if script.stall_at == Some(i) || i + 1 >= script.details.len() {
                    Err(Self::timeout(target, timeout))
                } else {
                    Ok(())
                }
            }
            _ => Err(Self::timeout(target, timeout)),
        }
    }

    async fn current_document(&mut self) -> AccessorResult<Document> {
        if self.pending.is_some() {
            self.stale_reads += 1;
        }
        let markup = match self.view {
            View::Blank => "<html></html>".to_string(),
            View::Entry => ENTRY_PAGE.to_string(),
            View::Results(token) => {
                let script = self.script(token);
                match script.results {
                    Results::Grid => results_page(script.details.len()),
                    Results::Garbled => {
                        "<html><body><h1>Service Unavailable</h1></body></html>".to_string()
                    }
                }
            }
            View::Detail(token, i) => self.script(token).details[i].clone(),
        };
        Ok(Document::parse(&markup))
    }
}

fn results_page(rows: usize) -> String {
    let mut grid = String::from("<tr><th>Owner</th><th>Property</th></tr>");
    for i in 0..rows {
        grid.push_str(&format!(
            r#"<tr><td><a id="ucResultsGrid_ctl0{i}_lnk">OWNER</a></td><td>R{i}</td></tr>"#
        ));
    }
    format!(
        r#"<html><body><div id="dvPrimary"><table><tbody>{grid}</tbody></table></div></body></html>"#
    )
}

fn property_id(token: char, index: usize) -> String {
    format!("R-{}-{}", token, index)
}

/// A complete detail page for record `index` of `token`
fn detail_page(token: char, index: usize) -> String {
    detail_page_with(&property_id(token, index), &format!("G-{}-{}", token, index))
}

fn detail_page_with(property_id: &str, geo_id: &str) -> String {
    format!(
        r#"<html><body>
        <table>
          <tr><th>Property ID</th><td id="ucidentification_webprop_id">{property_id}</td></tr>
          <tr><th>Geo ID</th><td id="ucidentification_webprop_geoid">{geo_id}</td></tr>
          <tr><th>Name</th><td id="webprop_name">OWNER {property_id}</td></tr>
          <tr><th>Mailing</th><td id="webprop_mailaddress">PO BOX 1<br>SULPHUR SPRINGS TX</td></tr>
          <tr><th>Legal</th><td id="webprop_desc">ABS 1 TR 2</td></tr>
          <tr><th>Situs</th><td id="webprop_situs">100 MAIN ST</td></tr>
          <tr><td id="histimp0_yr">$1</td><td id="histlnd0_yr">$2</td>
              <td id="histmkt0_yr">$3</td><td id="histassd0_yr">$3</td></tr>
        </table>
        <table><thead><tr><th>Code</th><th>Acres</th></tr></thead>
          <tbody id="tableLnd"><tr><td>E1</td><td>1.0000</td></tr></tbody></table>
        <table><tbody id="tableSale">
          <tr><td>SELLER</td><td>10</td><td>20</td><td>01/02/2003</td><td>2003-1</td></tr>
        </tbody></table>
        </body></html>"#
    )
}

fn test_config() -> Config {
    let mut config = Config::default();
    config.sweep.step_timeout_ms = 200;
    config.sweep.detail_timeout_ms = 200;
    config
}

fn range(start: &str, end: &str) -> TokenRange {
    TokenRange::new(start.parse().unwrap(), end.parse().unwrap()).unwrap()
}

fn token(s: &str) -> SearchToken {
    s.parse().unwrap()
}

/// Returns the CSV lines of the output file
fn output_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

/// Returns the Property ID column of every data row
fn written_ids(path: &Path) -> Vec<String> {
    output_lines(path)
        .iter()
        .filter(|line| !line.starts_with("Property ID,"))
        .map(|line| line.split(',').next().unwrap_or_default().to_string())
        .collect()
}

fn header_count(path: &Path) -> usize {
    output_lines(path)
        .iter()
        .filter(|line| line.starts_with("Property ID,"))
        .count()
}

async fn sweep(
    site: &mut ScriptedSite,
    csv: &Path,
    storage: &mut SqliteStorage,
    tokens: TokenRange,
) -> SweepReport {
    let mut sink = CsvSink::open(csv).unwrap();
    let config = test_config();
    run_sweep(&config, tokens, site, &mut sink, storage)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_two_results_written_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("out.csv");
    let mut storage = SqliteStorage::new_in_memory().unwrap();
    let mut site = ScriptedSite::new().with('A', TokenScript::records('A', 2));

    let report = sweep(&mut site, &csv, &mut storage, range("A", "A")).await;

    let lines = output_lines(&csv);
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("Property ID,Geo ID,Owner Name,Mailing Address,"));
    assert!(lines[0].ends_with(",Deed Pages,Deed Volume,Deed Instruments"));
    assert_eq!(written_ids(&csv), vec!["R-A-0", "R-A-1"]);
    assert!(lines[1].starts_with("R-A-0,G-A-0,OWNER R-A-0,\"PO BOX 1, SULPHUR SPRINGS TX\","));
    assert!(lines[1].ends_with(",E1,1.0000,01/02/2003,SELLER,20,10,2003-1"));

    let summary = report.token_summary(token("A")).unwrap();
    assert_eq!(summary.outcome, TokenOutcome::Completed);
    assert_eq!(summary.total, Some(2));
    assert_eq!(summary.records_written, 2);
    assert_eq!(report.records_written, 2);
    assert!(report.skips.is_empty());
}

#[tokio::test]
async fn test_zero_results_skips_detail_view_and_continues() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("out.csv");
    let mut storage = SqliteStorage::new_in_memory().unwrap();
    let mut site = ScriptedSite::new()
        .with('A', TokenScript::records('A', 1))
        .with('B', TokenScript::records('B', 0))
        .with('C', TokenScript::records('C', 1));

    let report = sweep(&mut site, &csv, &mut storage, range("A", "C")).await;

    assert_eq!(
        report.token_summary(token("B")).unwrap().outcome,
        TokenOutcome::NoResults
    );
    assert_eq!(site.detail_opens, vec!['A', 'C']);
    assert_eq!(written_ids(&csv), vec!["R-A-0", "R-C-0"]);
    assert_eq!(header_count(&csv), 1);
}

#[tokio::test]
async fn test_unreadable_count_skips_token() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("out.csv");
    let mut storage = SqliteStorage::new_in_memory().unwrap();
    let mut site = ScriptedSite::new()
        .with('C', TokenScript::garbled())
        .with('D', TokenScript::records('D', 1));

    let report = sweep(&mut site, &csv, &mut storage, range("C", "D")).await;

    let c = report.token_summary(token("C")).unwrap();
    assert_eq!(c.outcome, TokenOutcome::CountUnreadable);
    assert_eq!(c.total, None);
    assert_eq!(c.records_written, 0);
    assert_eq!(report.count_skips(SkipKind::ParseFailure), 1);
    assert_eq!(report.skips[0].token, token("C"));
    assert_eq!(written_ids(&csv), vec!["R-D-0"]);
}

#[tokio::test]
async fn test_advance_timeout_aborts_rest_of_token() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("out.csv");
    let mut storage = SqliteStorage::new_in_memory().unwrap();
    let mut stalled = TokenScript::records('D', 3);
    stalled.stall_at = Some(0);
    let mut site = ScriptedSite::new()
        .with('D', stalled)
        .with('E', TokenScript::records('E', 2));

    let report = sweep(&mut site, &csv, &mut storage, range("D", "E")).await;

    let d = report.token_summary(token("D")).unwrap();
    assert_eq!(d.outcome, TokenOutcome::Aborted);
    assert_eq!(d.total, Some(3));
    assert_eq!(d.records_written, 1);
    assert_eq!(report.count_skips(SkipKind::NavigationTimeout), 1);
    assert_eq!(report.skips[0].position, Some(0));

    assert_eq!(
        report.token_summary(token("E")).unwrap().outcome,
        TokenOutcome::Completed
    );
    assert_eq!(written_ids(&csv), vec!["R-D-0", "R-E-0", "R-E-1"]);
}

#[tokio::test]
async fn test_failed_search_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("out.csv");
    let mut storage = SqliteStorage::new_in_memory().unwrap();
    let mut broken = TokenScript::records('F', 2);
    broken.search_fails = true;
    let mut site = ScriptedSite::new()
        .with('F', broken)
        .with('G', TokenScript::records('G', 1));

    let report = sweep(&mut site, &csv, &mut storage, range("F", "G")).await;

    assert_eq!(
        report.token_summary(token("F")).unwrap().outcome,
        TokenOutcome::SearchTimeout
    );
    assert_eq!(written_ids(&csv), vec!["R-G-0"]);
}

#[tokio::test]
async fn test_header_written_once_after_empty_tokens() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("out.csv");
    let mut storage = SqliteStorage::new_in_memory().unwrap();
    let mut site = ScriptedSite::new()
        .with('C', TokenScript::records('C', 1))
        .with('E', TokenScript::records('E', 2));

    sweep(&mut site, &csv, &mut storage, range("A", "F")).await;

    let lines = output_lines(&csv);
    assert!(lines[0].starts_with("Property ID,"));
    assert_eq!(header_count(&csv), 1);
    assert_eq!(written_ids(&csv), vec!["R-C-0", "R-E-0", "R-E-1"]);
}

#[tokio::test]
async fn test_no_header_when_nothing_found() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("out.csv");
    let mut storage = SqliteStorage::new_in_memory().unwrap();
    let mut site = ScriptedSite::new();

    let report = sweep(&mut site, &csv, &mut storage, range("X", "Z")).await;

    assert_eq!(report.count_outcome(TokenOutcome::NoResults), 3);
    assert!(output_lines(&csv).is_empty());
}

#[tokio::test]
async fn test_header_not_rewritten_when_appending() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("out.csv");
    let mut storage = SqliteStorage::new_in_memory().unwrap();

    let mut site = ScriptedSite::new().with('A', TokenScript::records('A', 1));
    sweep(&mut site, &csv, &mut storage, range("A", "A")).await;

    let mut site = ScriptedSite::new().with('B', TokenScript::records('B', 1));
    sweep(&mut site, &csv, &mut storage, range("B", "B")).await;

    assert_eq!(header_count(&csv), 1);
    assert_eq!(written_ids(&csv), vec!["R-A-0", "R-B-0"]);
}

#[tokio::test]
async fn test_tokens_visited_once_in_alphabet_order() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("out.csv");
    let mut storage = SqliteStorage::new_in_memory().unwrap();
    let mut site = ScriptedSite::new()
        .with('Q', TokenScript::records('Q', 1))
        .with('7', TokenScript::records('7', 1));

    let report = sweep(&mut site, &csv, &mut storage, TokenRange::full()).await;

    let searched: String = site.searches.iter().collect();
    assert_eq!(searched, "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789");
    assert_eq!(report.tokens.len(), 36);
    assert_eq!(written_ids(&csv), vec!["R-Q-0", "R-7-0"]);

    let ledger = storage.get_token_outcomes(report.run_id).unwrap();
    assert_eq!(ledger.len(), 36);
    assert_eq!(ledger[0].token, "A");
    assert_eq!(ledger[35].token, "9");
    assert_eq!(
        storage.get_run(report.run_id).unwrap().status,
        RunStatus::Completed
    );
}

#[tokio::test]
async fn test_missing_identity_skips_only_that_record() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("out.csv");
    let mut storage = SqliteStorage::new_in_memory().unwrap();
    let mut script = TokenScript::records('H', 3);
    script.details[1] = detail_page_with("R-H-1", "");
    let mut site = ScriptedSite::new().with('H', script);

    let report = sweep(&mut site, &csv, &mut storage, range("H", "H")).await;

    assert_eq!(written_ids(&csv), vec!["R-H-0", "R-H-2"]);
    let h = report.token_summary(token("H")).unwrap();
    assert_eq!(h.outcome, TokenOutcome::Completed);
    assert_eq!(h.records_written, 2);

    let skip = &report.skips[0];
    assert_eq!(skip.kind, SkipKind::IdentityMissing);
    assert_eq!(skip.position, Some(1));
    assert_eq!(skip.field, Some(Field::GeoId));

    let stored = storage.get_skip_events(report.run_id).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].field.as_deref(), Some("Geo ID"));
}

#[tokio::test]
async fn test_defaulted_field_still_writes_row() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("out.csv");
    let mut storage = SqliteStorage::new_in_memory().unwrap();
    let mut script = TokenScript::records('K', 1);
    script.details[0] = script.details[0].replace(r#"<td id="webprop_situs">100 MAIN ST</td>"#, "");
    let mut site = ScriptedSite::new().with('K', script);

    let report = sweep(&mut site, &csv, &mut storage, range("K", "K")).await;

    assert_eq!(written_ids(&csv), vec!["R-K-0"]);
    assert_eq!(report.count_skips(SkipKind::DefaultedField), 1);
    assert_eq!(report.skips[0].field, Some(Field::Situs));
    assert!(output_lines(&csv)[1].contains(",ABS 1 TR 2,,$1,"));
}

#[tokio::test]
async fn test_cancellation_stops_between_tokens() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("out.csv");
    let mut storage = SqliteStorage::new_in_memory().unwrap();
    let cancel = CancellationToken::new();
    let mut site = ScriptedSite::new()
        .with('A', TokenScript::records('A', 1))
        .with('B', TokenScript::records('B', 2))
        .with('C', TokenScript::records('C', 1));
    site.cancel_after_search = Some(('B', cancel.clone()));

    let mut sink = CsvSink::open(&csv).unwrap();
    let report = Orchestrator::new(&test_config(), &mut site, &mut sink, &mut storage)
        .unwrap()
        .with_cancellation(cancel)
        .run(range("A", "E"))
        .await
        .unwrap();

    assert!(report.cancelled);
    assert_eq!(report.visited_tokens(), vec![token("A"), token("B")]);
    assert_eq!(report.count_outcome(TokenOutcome::Cancelled), 3);
    assert_eq!(site.searches, vec!['A', 'B']);
    assert_eq!(written_ids(&csv), vec!["R-A-0", "R-B-0", "R-B-1"]);

    let run = storage.get_run(report.run_id).unwrap();
    assert_eq!(run.status, RunStatus::Interrupted);
    assert_eq!(
        storage.last_finished_token(report.run_id).unwrap(),
        Some(token("B"))
    );
}

async fn cancellable_sweep(
    site: &mut ScriptedSite,
    csv: &Path,
    storage: &mut SqliteStorage,
    tokens: TokenRange,
    cancel: CancellationToken,
) -> SweepReport {
    let mut sink = CsvSink::open(csv).unwrap();
    let config = test_config();
    let mut orchestrator = Orchestrator::new(&config, site, &mut sink, storage)
        .unwrap()
        .with_cancellation(cancel);
    orchestrator.run(tokens).await.unwrap()
}

#[tokio::test]
async fn test_resume_does_not_repeat_rows() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("out.csv");
    let mut storage = SqliteStorage::new_in_memory().unwrap();
    let full = range("A", "D");

    let scripted = || {
        ScriptedSite::new()
            .with('A', TokenScript::records('A', 2))
            .with('B', TokenScript::records('B', 1))
            .with('C', TokenScript::records('C', 1))
            .with('D', TokenScript::records('D', 1))
    };

    // Interrupted after B
    let cancel = CancellationToken::new();
    let mut site = scripted();
    site.cancel_after_search = Some(('B', cancel.clone()));
    let first = cancellable_sweep(&mut site, &csv, &mut storage, full, cancel).await;
    assert!(first.cancelled);

    let resumed = resume_range(&storage, full).unwrap().unwrap();
    assert_eq!(resumed, range("C", "D"));

    // Resumed, then interrupted again before finishing anything
    let cancel = CancellationToken::new();
    cancel.cancel();
    let mut site = scripted();
    let second = cancellable_sweep(&mut site, &csv, &mut storage, resumed, cancel).await;
    assert!(site.searches.is_empty());
    assert_eq!(second.count_outcome(TokenOutcome::Cancelled), 2);

    let resumed = resume_range(&storage, full).unwrap().unwrap();
    assert_eq!(resumed, range("C", "D"));

    let mut site = scripted();
    let third = sweep(&mut site, &csv, &mut storage, resumed).await;

    assert_eq!(site.searches, vec!['C', 'D']);
    assert!(!third.cancelled);
    assert_eq!(written_ids(&csv), vec!["R-A-0", "R-A-1", "R-B-0", "R-C-0", "R-D-0"]);
    assert_eq!(header_count(&csv), 1);
    assert_eq!(resume_range(&storage, full).unwrap(), None);
}

#[tokio::test]
async fn test_detail_page_never_ready_aborts_token() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("out.csv");
    let mut storage = SqliteStorage::new_in_memory().unwrap();
    let mut slow = TokenScript::records('L', 3);
    slow.stall_ready_at = Some(1);
    let mut site = ScriptedSite::new()
        .with('L', slow)
        .with('M', TokenScript::records('M', 1));

    let report = sweep(&mut site, &csv, &mut storage, range("L", "M")).await;

    let l = report.token_summary(token("L")).unwrap();
    assert_eq!(l.outcome, TokenOutcome::Aborted);
    assert_eq!(l.total, Some(3));
    assert_eq!(l.records_written, 1);
    assert_eq!(report.count_skips(SkipKind::NavigationTimeout), 1);
    assert_eq!(report.skips[0].position, Some(1));
    assert_eq!(written_ids(&csv), vec!["R-L-0", "R-M-0"]);
}

#[tokio::test]
async fn test_unclickable_first_result_aborts_token() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("out.csv");
    let mut storage = SqliteStorage::new_in_memory().unwrap();
    let mut broken = TokenScript::records('N', 2);
    broken.first_result_missing = true;
    let mut site = ScriptedSite::new()
        .with('N', broken)
        .with('O', TokenScript::records('O', 1));

    let report = sweep(&mut site, &csv, &mut storage, range("N", "O")).await;

    let n = report.token_summary(token("N")).unwrap();
    assert_eq!(n.outcome, TokenOutcome::Aborted);
    assert_eq!(n.total, Some(2));
    assert_eq!(n.records_written, 0);
    assert_eq!(report.skips[0].kind, SkipKind::NavigationTimeout);
    assert_eq!(report.skips[0].position, Some(0));
    assert_eq!(site.detail_opens, vec!['O']);
    assert_eq!(written_ids(&csv), vec!["R-O-0"]);
}

#[tokio::test]
async fn test_every_page_change_is_waited_out_before_reading() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("out.csv");
    let mut storage = SqliteStorage::new_in_memory().unwrap();
    let mut site = ScriptedSite::new()
        .with('P', TokenScript::records('P', 4))
        .with('Q', TokenScript::records('Q', 2));

    sweep(&mut site, &csv, &mut storage, range("P", "Q")).await;

    assert_eq!(site.stale_reads, 0);
    assert_eq!(
        written_ids(&csv),
        vec!["R-P-0", "R-P-1", "R-P-2", "R-P-3", "R-Q-0", "R-Q-1"]
    );
}
