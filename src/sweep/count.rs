//! Result count reader
//!
//! Reads how many records a search matched from the results page, either by
//! counting grid rows or by parsing a number out of a text element.

use crate::config::{CountStrategy, ResultCountConfig};
use crate::document::{compile_selector, Document};
use crate::sweep::SweepFailure;
use crate::SweepError;
use scraper::Selector;

/// Compiled form of [`ResultCountConfig`]
#[derive(Debug, Clone)]
pub struct ResultCountReader {
    strategy: CountStrategy,
    selector: Selector,
    container: Option<Selector>,
    header_rows: usize,
}

impl ResultCountReader {
    pub fn new(config: &ResultCountConfig) -> Result<Self, SweepError> {
        let compile = |css: &str| {
            compile_selector(css).map_err(|message| SweepError::Selector {
                selector: css.to_string(),
                message,
            })
        };

        Ok(Self {
            strategy: config.strategy,
            selector: compile(&config.selector)?,
            container: config.container.as_deref().map(compile).transpose()?,
            header_rows: config.header_rows,
        })
    }

    /// Reads the result count from a results page
    ///
    /// # Returns
    ///
    /// * `Ok(n)` - The search matched `n` records
    /// * `Err(SweepFailure::ParseFailure)` - The page does not carry a readable count
    pub fn read(&self, document: &Document) -> Result<usize, SweepFailure> {
        match self.strategy {
            CountStrategy::Rows => self.count_rows(document),
            CountStrategy::Text => self.parse_text(document),
        }
    }

    fn count_rows(&self, document: &Document) -> Result<usize, SweepFailure> {
        if let Some(container) = &self.container {
            if !document.contains(container) {
                return Err(SweepFailure::ParseFailure {
                    what: "result count".to_string(),
                    reason: "results container not found".to_string(),
                });
            }
        }

        let rows = document.count(&self.selector);
        Ok(rows.saturating_sub(self.header_rows))
    }

    fn parse_text(&self, document: &Document) -> Result<usize, SweepFailure> {
        let text = document
            .text_of(&self.selector)
            .ok_or_else(|| SweepFailure::ParseFailure {
                what: "result count".to_string(),
                reason: "count element not found".to_string(),
            })?;

        parse_count(&text).ok_or_else(|| SweepFailure::ParseFailure {
            what: "result count".to_string(),
            reason: format!("no number in '{}'", text),
        })
    }
}

/// Parses the first run of digits in `text`, allowing `,` thousands separators
fn parse_count(text: &str) -> Option<usize> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == ',')
        .filter(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}
