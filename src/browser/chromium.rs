//! Chromium-backed document accessor
//!
//! Launches a local Chromium through `chromiumoxide`, keeps a single tab open
//! for the whole sweep, and implements the accessor operations on top of CDP.

use crate::browser::{AccessorError, AccessorResult, DocumentAccessor, Locator};
use crate::config::BrowserConfig as BrowserSettings;
use crate::document::Document;
use crate::SweepError;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::Page;
use futures::StreamExt;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Interval between presence checks while waiting for an element
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// How long resource activity must stay flat before the page counts as idle
const IDLE_WINDOW_MS: u64 = 500;

/// Tags the current document; a navigation replaces `window` and drops the tag
const MARK_DOCUMENT: &str = "window.__parcelSweepStale = true";

/// True while the tagged document is still the one being shown
const DOCUMENT_MARKED: &str = "window.__parcelSweepStale === true";

/// A single-tab Chromium session
///
/// Every control the sweep clicks is a postback, so a click leaves a page
/// change pending. The next wait does not succeed until the clicked document
/// has been replaced and the new one has loaded.
pub struct ChromiumAccessor {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
    navigation_pending: bool,
}

impl ChromiumAccessor {
    /// Launches Chromium and opens the working tab
    ///
    /// # Arguments
    ///
    /// * `settings` - Browser section of the configuration
    ///
    /// # Returns
    ///
    /// * `Ok(ChromiumAccessor)` - Browser is up with one blank tab
    /// * `Err(SweepError::Launch)` - Chromium could not be started
    pub async fn launch(settings: &BrowserSettings) -> Result<Self, SweepError> {
        let mut builder = BrowserConfig::builder().window_size(settings.window_width, settings.window_height);
        if !settings.headless {
            builder = builder.with_head();
        }
        if let Some(executable) = &settings.executable {
            builder = builder.chrome_executable(executable);
        }
        let config = builder.build().map_err(SweepError::Launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| SweepError::Launch(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::warn!("CDP handler event error: {}", e);
                }
            }
            tracing::debug!("CDP handler stream closed");
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| SweepError::Launch(format!("failed to open tab: {}", e)))?;

        tracing::info!("Chromium session started (headless: {})", settings.headless);

        Ok(Self {
            browser,
            page,
            handler_task,
            navigation_pending: false,
        })
    }

    /// Closes the browser and waits for the event handler to finish
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            tracing::warn!("Failed to close browser cleanly: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            tracing::debug!("Browser process wait failed: {}", e);
        }
        self.handler_task.abort();
    }

    async fn find(&self, target: &Locator) -> AccessorResult<Element> {
        let found = match target {
            Locator::Css(selector) => self.page.find_element(selector.as_str()).await,
            Locator::XPath(expression) => self.page.find_xpath(expression.as_str()).await,
        };
        found.map_err(|e| {
            tracing::trace!("Lookup of {} failed: {}", target, e);
            AccessorError::NotFound(target.clone())
        })
    }

    /// Waits out the page change started by the last click, if any
    async fn settle(&mut self, timeout: Duration) -> AccessorResult<()> {
        if !self.navigation_pending {
            return Ok(());
        }

        let started = Instant::now();
        let page = &self.page;
        wait_for_replacement(timeout, move || document_marked(page)).await?;

        let remaining = timeout.saturating_sub(started.elapsed());
        tokio::time::timeout(remaining, self.page.wait_for_navigation())
            .await
            .map_err(|_| AccessorError::Timeout {
                what: "page load after click".to_string(),
                waited: timeout,
            })?
            .map_err(browser_error)?;

        self.navigation_pending = false;
        tracing::trace!("Page replaced after {:?}", started.elapsed());
        Ok(())
    }

    async fn idle_once(&self, timeout: Duration) -> AccessorResult<()> {
        let script = idle_check_script(timeout);
        // The script polices its own budget; the outer bound covers a hung CDP call.
        let outer = timeout + Duration::from_secs(5);
        let evaluation = tokio::time::timeout(outer, self.page.evaluate(script))
            .await
            .map_err(|_| AccessorError::Timeout {
                what: "network idle".to_string(),
                waited: outer,
            })?
            .map_err(browser_error)?;

        let idle = evaluation.into_value::<bool>().map_err(browser_error)?;
        if idle {
            Ok(())
        } else {
            Err(AccessorError::Timeout {
                what: "network idle".to_string(),
                waited: timeout,
            })
        }
    }
}

async fn document_marked(page: &Page) -> AccessorResult<bool> {
    page.evaluate(DOCUMENT_MARKED)
        .await
        .map_err(browser_error)?
        .into_value::<bool>()
        .map_err(browser_error)
}

/// Polls `still_marked` until the tagged document is gone
///
/// A failed check counts as "not yet": evaluation fails while the old
/// execution context is being torn down.
async fn wait_for_replacement<F, Fut>(timeout: Duration, mut still_marked: F) -> AccessorResult<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AccessorResult<bool>>,
{
    let deadline = Instant::now() + timeout;
    loop {
        match still_marked().await {
            Ok(false) => return Ok(()),
            Ok(true) => {}
            Err(e) => tracing::trace!("Document check failed mid-navigation: {}", e),
        }
        if Instant::now() >= deadline {
            return Err(AccessorError::Timeout {
                what: "page change after click".to_string(),
                waited: timeout,
            });
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

fn browser_error(e: impl std::fmt::Display) -> AccessorError {
    AccessorError::Browser(e.to_string())
}

/// Builds the in-page script that resolves once the resource count stops
/// changing and the document is complete, or once the budget is spent
fn idle_check_script(timeout: Duration) -> String {
    let timeout_ms = timeout.as_millis().min(u128::from(u64::MAX)) as u64;
    format!(
        r#"(async () => {{
            const budget = {timeout_ms};
            const idleMs = {idle_ms};
            const interval = 100;
            const start = Date.now();
            const resources = () => {{
                try {{ return performance.getEntriesByType('resource').length; }} catch (_) {{ return 0; }}
            }};
            let last = resources();
            let stable = 0;
            while (Date.now() - start < budget) {{
                await new Promise(r => setTimeout(r, interval));
                const now = resources();
                if (document.readyState === 'complete' && now === last) {{
                    stable += interval;
                    if (stable >= idleMs) return true;
                }} else {{
                    stable = 0;
                }}
                last = now;
            }}
            return false;
        }})()"#,
        timeout_ms = timeout_ms,
        idle_ms = IDLE_WINDOW_MS,
    )
}

#[async_trait]
impl DocumentAccessor for ChromiumAccessor {
    async fn open(&mut self, url: &str) -> AccessorResult<()> {
        tracing::debug!("Navigating to {}", url);
        self.page.goto(url).await.map_err(browser_error)?;
        self.navigation_pending = false;
        Ok(())
    }

    async fn fill(&mut self, target: &Locator, text: &str) -> AccessorResult<()> {
        let element = self.find(target).await?;
        element
            .call_js_fn("function() { this.value = ''; }", false)
            .await
            .map_err(browser_error)?;
        element.click().await.map_err(browser_error)?;
        element.type_str(text).await.map_err(browser_error)?;
        Ok(())
    }

    async fn click(&mut self, target: &Locator) -> AccessorResult<()> {
        let element = self.find(target).await?;
        self.page.evaluate(MARK_DOCUMENT).await.map_err(browser_error)?;
        element.click().await.map_err(browser_error)?;
        self.navigation_pending = true;
        Ok(())
    }

    async fn wait_for_idle(&mut self, timeout: Duration) -> AccessorResult<()> {
        let deadline = Instant::now() + timeout;
        self.settle(timeout).await?;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.idle_once(remaining).await {
                Err(AccessorError::Browser(e)) if Instant::now() < deadline => {
                    tracing::trace!("Idle check interrupted, retrying: {}", e);
                    tokio::time::sleep(POLL_INTERVAL).await;
                }
                outcome => return outcome,
            }
        }
    }

    async fn wait_for_selector(
        &mut self,
        target: &Locator,
        timeout: Duration,
    ) -> AccessorResult<()> {
        let deadline = Instant::now() + timeout;
        self.settle(timeout).await?;

        loop {
            if self.find(target).await.is_ok() {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(AccessorError::Timeout {
                    what: target.to_string(),
                    waited: timeout,
                });
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn current_document(&mut self) -> AccessorResult<Document> {
        let markup = self.page.content().await.map_err(browser_error)?;
        Ok(Document::parse(&markup))
    }
}
