//! Parsed snapshot of a rendered page
//!
//! The browser hands back raw markup; this module turns it into an
//! addressable tree and provides the normalized text reads the extractor and
//! the result-count reader are built on.

use scraper::{ElementRef, Html, Selector};

/// Separator placed between the text nodes of one element
pub const TEXT_SEPARATOR: &str = ", ";

/// A rendered document captured from the browser session
#[derive(Debug, Clone)]
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses a full HTML document
    pub fn parse(markup: &str) -> Self {
        Self {
            html: Html::parse_document(markup),
        }
    }

    /// Returns the first element matching the selector
    pub fn select_first(&self, selector: &Selector) -> Option<ElementRef<'_>> {
        self.html.select(selector).next()
    }

    /// Returns true if at least one element matches the selector
    pub fn contains(&self, selector: &Selector) -> bool {
        self.select_first(selector).is_some()
    }

    /// Counts the elements matching the selector
    pub fn count(&self, selector: &Selector) -> usize {
        self.html.select(selector).count()
    }

    /// Reads the normalized text of the first element matching the selector
    ///
    /// Returns `None` when no element matches. An element with no visible text
    /// yields `Some("")`.
    pub fn text_of(&self, selector: &Selector) -> Option<String> {
        self.select_first(selector).map(normalized_text)
    }
}

/// Compiles a CSS selector, reporting the parser's complaint as a string
pub fn compile_selector(css: &str) -> Result<Selector, String> {
    Selector::parse(css).map_err(|e| e.to_string())
}

/// Collapses an element's text into one line
///
/// Each descendant text node is trimmed and its internal whitespace collapsed
/// to single spaces; empty nodes are dropped and the rest joined with
/// [`TEXT_SEPARATOR`].
pub fn normalized_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(collapse_whitespace)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(TEXT_SEPARATOR)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
