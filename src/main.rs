//! Parcel-Sweep main entry point
//!
//! This is the command-line interface for the Parcel-Sweep property sweeper.

use anyhow::{Context, Result};
use clap::Parser;
use parcel_sweep::browser::ChromiumAccessor;
use parcel_sweep::config::{hash_content, load_config_with_hash, Config, ConfigOverrides};
use parcel_sweep::output::CsvSink;
use parcel_sweep::storage::{open_storage, SqliteStorage};
use parcel_sweep::sweep::{resume_range, Orchestrator};
use parcel_sweep::TokenOutcome;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Parcel-Sweep: an exhaustive property-record sweeper
///
/// Parcel-Sweep searches a property index one token at a time (A-Z, then
/// 0-9), walks every matching detail page in a headless browser, and appends
/// each record to a CSV file. Progress is kept in a SQLite ledger so an
/// interrupted sweep can be resumed.
#[derive(Parser, Debug)]
#[command(name = "parcel-sweep")]
#[command(version = "1.0.0")]
#[command(about = "An exhaustive property-record sweeper", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Index entry page to sweep
    #[arg(long, value_name = "URL")]
    site_url: Option<String>,

    /// CSV file to append records to
    #[arg(long, value_name = "PATH")]
    output: Option<String>,

    /// First search token (A-Z or 0-9)
    #[arg(long, value_name = "TOKEN")]
    start_token: Option<String>,

    /// Last search token (A-Z or 0-9)
    #[arg(long, value_name = "TOKEN")]
    end_token: Option<String>,

    /// Bound for each search and navigation step, in milliseconds
    #[arg(long, value_name = "MS")]
    step_timeout_ms: Option<u64>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Continue after the last token finished by the latest interrupted run
    #[arg(long)]
    resume: bool,

    /// Validate config and show the token plan without sweeping
    #[arg(long, conflicts_with_all = ["stats", "export_summary"])]
    dry_run: bool,

    /// Show statistics from the ledger and exit
    #[arg(long, conflicts_with_all = ["dry_run", "export_summary"])]
    stats: bool,

    /// Generate a markdown skip report for the latest run and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    export_summary: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            site_url: self.site_url.clone(),
            output_path: self.output.clone(),
            start_token: self.start_token.clone(),
            end_token: self.end_token.clone(),
            step_timeout_ms: self.step_timeout_ms,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let (mut config, config_hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (config, hash)
        }
        None => {
            tracing::info!("No configuration file given, using built-in defaults");
            (Config::default(), hash_content(""))
        }
    };

    let overrides = cli.overrides();
    if !overrides.is_empty() {
        config
            .apply_overrides(&overrides)
            .context("invalid command-line override")?;
    }

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.export_summary {
        handle_export_summary(&config)?;
    } else {
        handle_sweep(config, config_hash, cli.resume).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("parcel_sweep=info,warn"),
            1 => EnvFilter::new("parcel_sweep=debug,info"),
            2 => EnvFilter::new("parcel_sweep=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows the token plan
fn handle_dry_run(config: &Config) -> Result<()> {
    let range = config.sweep.token_range()?;

    println!("=== Parcel-Sweep Dry Run ===\n");

    println!("Site:");
    println!("  Entry page: {}", config.site.url);
    println!("  Search field: {}", config.site.search_field);
    println!("  Search button: {}", config.site.search_button);
    println!("  First result: {}", config.site.first_result);
    println!("  Next record: {}", config.site.next_record);
    println!("  Ready landmark: {}", config.site.ready_landmark);
    println!(
        "  Result count: {:?} via '{}' (header rows: {})",
        config.site.result_count.strategy,
        config.site.result_count.selector,
        config.site.result_count.header_rows
    );

    println!("\nSweep:");
    println!("  Step timeout: {}ms", config.sweep.step_timeout_ms);
    println!("  Detail timeout: {}ms", config.sweep.detail_timeout_ms);

    println!("\nBrowser:");
    println!("  Headless: {}", config.browser.headless);
    println!(
        "  Executable: {}",
        config.browser.executable.as_deref().unwrap_or("(auto-detect)")
    );

    println!("\nOutput:");
    println!("  CSV: {}", config.output.csv_path);
    println!("  Database: {}", config.output.database_path);
    println!("  Summary: {}", config.output.summary_path);

    let plan: Vec<String> = range.iter().map(|t| t.to_string()).collect();
    println!("\nToken plan ({}):", range.len());
    println!("  {}", plan.join(" "));

    println!("\n✓ Configuration is valid");
    println!("✓ Would search {} tokens", range.len());

    Ok(())
}

/// Handles the --stats mode: shows statistics from the ledger
fn handle_stats(config: &Config) -> Result<()> {
    use parcel_sweep::output::{load_statistics, print_statistics};

    println!("Database: {}\n", config.output.database_path);

    let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;

    match load_statistics(&storage)? {
        Some(stats) => print_statistics(&stats),
        None => println!("No sweep runs recorded yet"),
    }

    Ok(())
}

/// Handles the --export-summary mode: writes the markdown skip report
fn handle_export_summary(config: &Config) -> Result<()> {
    println!("=== Exporting Sweep Report ===\n");
    println!("Database: {}", config.output.database_path);
    println!("Output: {}", config.output.summary_path);
    println!();

    let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;
    write_summary(&storage, config)?;

    println!("✓ Report exported to: {}", config.output.summary_path);

    Ok(())
}

fn write_summary(storage: &SqliteStorage, config: &Config) -> Result<()> {
    use parcel_sweep::output::{generate_markdown_summary, generate_summary};

    tracing::info!("Loading sweep data from database...");
    let summary = generate_summary(storage)?;

    tracing::info!("Generating markdown report...");
    generate_markdown_summary(&summary, Path::new(&config.output.summary_path))?;

    Ok(())
}

/// Handles the main sweep operation
async fn handle_sweep(config: Config, config_hash: String, resume: bool) -> Result<()> {
    let mut range = config.sweep.token_range()?;
    let mut storage = open_storage(Path::new(&config.output.database_path))?;

    if resume {
        match resume_range(&storage, range)? {
            Some(resumed) => range = resumed,
            None => return Ok(()),
        }
    }

    tracing::info!("Sweeping {} ({} tokens: {})", config.site.url, range.len(), range);

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current token");
            interrupt.cancel();
        }
    });

    let mut sink = CsvSink::open(Path::new(&config.output.csv_path))
        .with_context(|| format!("cannot open {}", config.output.csv_path))?;
    let mut accessor = ChromiumAccessor::launch(&config.browser).await?;

    let result = match Orchestrator::new(&config, &mut accessor, &mut sink, &mut storage) {
        Ok(orchestrator) => {
            orchestrator
                .with_config_hash(config_hash)
                .with_cancellation(cancel)
                .run(range)
                .await
        }
        Err(e) => Err(e),
    };

    accessor.close().await;

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Sweep failed: {}", e);
            return Err(e.into());
        }
    };

    write_summary(&storage, &config)?;

    tracing::info!(
        "{} records written to {}; {} tokens skipped, {} skip events (report: {})",
        report.records_written,
        config.output.csv_path,
        report.tokens.iter().filter(|t| t.outcome.is_skip()).count(),
        report.skips.len(),
        config.output.summary_path
    );
    if report.count_outcome(TokenOutcome::Cancelled) > 0 {
        tracing::info!("Run again with --resume to continue");
    }

    Ok(())
}
