use crate::browser::Locator;
use serde::Deserialize;

/// Default target: the Hopkins County appraisal district property index
pub const DEFAULT_SITE_URL: &str =
    "https://iswdataclient.azurewebsites.net/webindex.aspx?dbkey=HOPKINSCAD";

/// Main configuration structure for Parcel-Sweep
///
/// Every section has defaults, so an empty file describes a full sweep of the
/// default site.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub sweep: SweepConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Where the index lives and how its pages are addressed
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Index entry page, loaded once per search token
    pub url: String,

    /// Text input that receives the search token
    #[serde(rename = "search-field")]
    pub search_field: Locator,

    /// Control that submits the search
    #[serde(rename = "search-button")]
    pub search_button: Locator,

    /// Link in the results grid that opens the first detail page
    #[serde(rename = "first-result")]
    pub first_result: Locator,

    /// Control on a detail page that moves to the next record
    #[serde(rename = "next-record")]
    pub next_record: Locator,

    /// Element whose presence means a detail page is ready for extraction
    #[serde(rename = "ready-landmark")]
    pub ready_landmark: Locator,

    /// How the number of results is read from the results page
    #[serde(rename = "result-count")]
    pub result_count: ResultCountConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SITE_URL.to_string(),
            search_field: Locator::css("#searchHeaderX_searchname"),
            search_button: Locator::xpath(
                "//input[@type='submit' and @value='Search'] | //button[normalize-space()='Search']",
            ),
            first_result: Locator::css("a[id^=\"ucResultsGrid\"]"),
            next_record: Locator::css("a#ucidentification_lbNext"),
            ready_landmark: Locator::xpath("//th[text() = \"Acres\"]"),
            result_count: ResultCountConfig::default(),
        }
    }
}

/// Strategy for reading the result count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountStrategy {
    /// Count the rows of the results grid
    Rows,
    /// Parse the number out of a text element
    Text,
}

/// Result count reader configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResultCountConfig {
    pub strategy: CountStrategy,

    /// CSS selector for the grid rows (`rows`) or the count element (`text`)
    pub selector: String,

    /// CSS selector that must be present for a `rows` count to be trusted
    pub container: Option<String>,

    /// Rows of the grid that are not results (`rows` only)
    #[serde(rename = "header-rows")]
    pub header_rows: usize,
}

impl Default for ResultCountConfig {
    fn default() -> Self {
        Self {
            strategy: CountStrategy::Rows,
            selector: "div#dvPrimary tbody tr".to_string(),
            container: Some("div#dvPrimary".to_string()),
            header_rows: 1,
        }
    }
}

/// Sweep range and wait bounds
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// First search token of the sweep (inclusive)
    #[serde(rename = "start-token")]
    pub start_token: String,

    /// Last search token of the sweep (inclusive)
    #[serde(rename = "end-token")]
    pub end_token: String,

    /// Bound for search-page quiescence and control lookups (milliseconds)
    #[serde(rename = "step-timeout-ms")]
    pub step_timeout_ms: u64,

    /// Bound for a detail page to show its ready landmark (milliseconds)
    #[serde(rename = "detail-timeout-ms")]
    pub detail_timeout_ms: u64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            start_token: "A".to_string(),
            end_token: "9".to_string(),
            step_timeout_ms: 30_000,
            detail_timeout_ms: 100_000,
        }
    }
}

/// Browser launch options
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub headless: bool,

    /// Explicit Chromium binary; auto-detected when absent
    pub executable: Option<String>,

    #[serde(rename = "window-width")]
    pub window_width: u32,

    #[serde(rename = "window-height")]
    pub window_height: u32,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            executable: None,
            window_width: 1280,
            window_height: 1024,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the append-only CSV file
    #[serde(rename = "csv-path")]
    pub csv_path: String,

    /// Path to the SQLite sweep ledger
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Path to the markdown skip report
    #[serde(rename = "summary-path")]
    pub summary_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv_path: "hopkins-properties.csv".to_string(),
            database_path: "parcel-sweep.db".to_string(),
            summary_path: "sweep-summary.md".to_string(),
        }
    }
}
