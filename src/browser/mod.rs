//! Browser session boundary
//!
//! The sweep never talks to a rendering engine directly. Everything it needs
//! from one goes through [`DocumentAccessor`]:
//! - loading the index entry page
//! - filling the search field and clicking controls
//! - waiting for quiescence or for a landmark element
//! - snapshotting the current document for extraction
//!
//! [`ChromiumAccessor`] is the production implementation, driving a headless
//! Chromium over CDP.

mod chromium;

pub use chromium::ChromiumAccessor;

use crate::document::Document;
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Errors reported by a document accessor
#[derive(Debug, Error)]
pub enum AccessorError {
    #[error("Timed out after {waited:?} waiting for {what}")]
    Timeout { what: String, waited: Duration },

    #[error("Element not found: {0}")]
    NotFound(Locator),

    #[error("Browser error: {0}")]
    Browser(String),
}

/// Result type for accessor operations
pub type AccessorResult<T> = Result<T, AccessorError>;

/// Addresses one element of the rendered page
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locator {
    /// A CSS selector
    Css(String),
    /// An XPath expression
    XPath(String),
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    pub fn xpath(expression: impl Into<String>) -> Self {
        Self::XPath(expression.into())
    }

    /// The raw selector or expression text
    pub fn as_str(&self) -> &str {
        match self {
            Self::Css(s) | Self::XPath(s) => s,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(s) => write!(f, "css:{}", s),
            Self::XPath(s) => write!(f, "xpath:{}", s),
        }
    }
}

/// One stateful browsing session
///
/// The document returned by [`current_document`](Self::current_document) is
/// only meaningful for the navigation that produced it, so a session must be
/// driven by a single caller at a time.
#[async_trait]
pub trait DocumentAccessor: Send {
    /// Navigates to a URL
    async fn open(&mut self, url: &str) -> AccessorResult<()>;

    /// Replaces the value of an input field with `text`
    async fn fill(&mut self, target: &Locator, text: &str) -> AccessorResult<()>;

    /// Clicks a control; returns once the click has been dispatched
    ///
    /// When the click replaces the document, the next `wait_for_idle` or
    /// `wait_for_selector` must not succeed against the old one. It waits for
    /// the replacement to load first.
    async fn click(&mut self, target: &Locator) -> AccessorResult<()>;

    /// Waits until the page reports no pending loads
    async fn wait_for_idle(&mut self, timeout: Duration) -> AccessorResult<()>;

    /// Waits until an element matching `target` is present
    async fn wait_for_selector(&mut self, target: &Locator, timeout: Duration)
        -> AccessorResult<()>;

    /// Snapshots the currently rendered document
    async fn current_document(&mut self) -> AccessorResult<Document>;
}
