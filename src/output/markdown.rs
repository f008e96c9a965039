//! Markdown skip report generation
//!
//! This module renders a human-readable report of one sweep run: what was
//! written, which tokens were skipped or cut short, and every skip event.

use crate::output::traits::{OutputResult, SweepSummary};
use crate::sweep::SkipKind;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Maximum skip events listed per kind before the list is truncated
const MAX_EVENTS_PER_KIND: usize = 100;

/// Writes a markdown report of a sweep run
///
/// # Arguments
///
/// * `summary` - The sweep summary data
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn generate_markdown_summary(summary: &SweepSummary, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(summary);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a sweep summary as markdown
pub fn format_markdown_summary(summary: &SweepSummary) -> String {
    let mut md = String::new();

    md.push_str("# Parcel-Sweep Run Report\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Run ID**: {}\n", summary.run_id));
    md.push_str(&format!("- **Started**: {}\n", summary.started_at));
    if let Some(finished) = &summary.finished_at {
        md.push_str(&format!("- **Finished**: {}\n", finished));
    }
    if let Some(duration) = summary.duration_seconds {
        md.push_str(&format!(
            "- **Duration**: {} seconds ({:.2} minutes)\n",
            duration,
            duration as f64 / 60.0
        ));
    }
    md.push_str(&format!("- **Status**: {}\n", summary.status));
    md.push_str(&format!("- **Config Hash**: {}\n\n", summary.config_hash));

    // Overall statistics
    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!(
        "- **Records Written**: {}\n",
        summary.records_written
    ));
    md.push_str(&format!(
        "- **Tokens Visited**: {}\n",
        summary.tokens_visited()
    ));
    md.push_str(&format!(
        "- **Tokens Skipped**: {}\n",
        summary.tokens_skipped()
    ));
    md.push_str(&format!(
        "- **Coverage**: {:.2}%\n\n",
        summary.coverage_rate()
    ));

    // Outcome breakdown
    md.push_str("## Token Outcomes\n\n");
    md.push_str("| Outcome | Tokens |\n");
    md.push_str("|---------|--------|\n");
    md.push_str(&format!("| Completed | {} |\n", summary.tokens_completed));
    md.push_str(&format!("| No Results | {} |\n", summary.tokens_no_results));
    md.push_str(&format!(
        "| Search Timeout | {} |\n",
        summary.tokens_search_timeout
    ));
    md.push_str(&format!(
        "| Count Unreadable | {} |\n",
        summary.tokens_count_unreadable
    ));
    md.push_str(&format!("| Aborted | {} |\n", summary.tokens_aborted));
    md.push_str(&format!(
        "| Not Visited | {} |\n\n",
        summary.tokens_cancelled
    ));

    // Skipped tokens
    if !summary.skipped_tokens.is_empty() {
        md.push_str("## Skipped Tokens\n\n");
        md.push_str("| Token | Outcome | Results | Written | Reason |\n");
        md.push_str("|-------|---------|---------|---------|--------|\n");

        for token in &summary.skipped_tokens {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                token.token,
                token.outcome,
                token
                    .total
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| "?".to_string()),
                token.records_written,
                escape_cell(token.message.as_deref().unwrap_or(""))
            ));
        }
        md.push('\n');
    }

    // Skip events, grouped by kind
    for kind in SkipKind::ALL {
        let events: Vec<_> = summary
            .skip_events
            .iter()
            .filter(|e| e.kind == kind)
            .collect();
        if events.is_empty() {
            continue;
        }

        md.push_str(&format!("## {} ({})\n\n", section_title(kind), events.len()));
        md.push_str("| Token | Record | Field | Message |\n");
        md.push_str("|-------|--------|-------|---------|\n");

        for event in events.iter().take(MAX_EVENTS_PER_KIND) {
            md.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                event.token,
                event
                    .position
                    .map(|p| (p + 1).to_string())
                    .unwrap_or_else(|| "-".to_string()),
                event.field.as_deref().unwrap_or("-"),
                escape_cell(&event.message)
            ));
        }
        if events.len() > MAX_EVENTS_PER_KIND {
            md.push_str(&format!(
                "\n... and {} more\n",
                events.len() - MAX_EVENTS_PER_KIND
            ));
        }
        md.push('\n');
    }

    md
}

fn section_title(kind: SkipKind) -> &'static str {
    match kind {
        SkipKind::ParseFailure => "Parse Failures",
        SkipKind::NavigationTimeout => "Navigation Timeouts",
        SkipKind::IdentityMissing => "Records Missing Identity",
        SkipKind::DefaultedField => "Defaulted Fields",
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
