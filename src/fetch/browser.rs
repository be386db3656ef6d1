//! Rendered page fetching through headless Chrome
//!
//! A [`BrowserSession`] owns one Chrome process and the task pumping its
//! DevTools events. Sessions are closed on every exit path: the fetch logic
//! runs to completion (or error) first, then the session is closed
//! unconditionally, and `Drop` tears down the event task if `close` was never
//! reached.

use crate::config::{FetcherConfig, Locator, SourceProfile};
use crate::fetch::driver::{capture_pages, PageDriver, SettleWait};
use crate::fetch::FetchOutput;
use crate::HarvestError;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures_util::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;

/// A running Chrome instance
pub struct BrowserSession {
    browser: Browser,
    events: JoinHandle<()>,
    closed: bool,
}

impl BrowserSession {
    /// Launches Chrome with the fetcher's settings
    pub async fn launch(config: &FetcherConfig) -> Result<Self, HarvestError> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-dev-shm-usage")
            .request_timeout(Duration::from_secs(config.request_timeout_secs));

        if !config.headless {
            builder = builder.with_head();
        }
        if let Some(executable) = &config.chrome_executable {
            builder = builder.chrome_executable(executable);
        }

        let browser_config = builder.build().map_err(HarvestError::Browser)?;
        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| HarvestError::Browser(format!("failed to launch Chrome: {}", e)))?;

        let events = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        tracing::debug!("Browser session started");

        Ok(Self {
            browser,
            events,
            closed: false,
        })
    }

    /// Opens a new tab and navigates it to `url`
    pub async fn open(&self, url: &str) -> Result<Page, HarvestError> {
        self.browser
            .new_page(url)
            .await
            .map_err(|e| HarvestError::fetch_failed(url, format!("navigation failed: {}", e)))
    }

    /// Closes Chrome and waits for the event task to finish
    ///
    /// Close failures are logged rather than returned: they must not mask the
    /// outcome of the fetch that used the session.
    pub async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        shut_down(&mut self.browser).await;

        if let Err(e) = (&mut self.events).await {
            if !e.is_cancelled() {
                tracing::warn!("Browser event task ended abnormally: {}", e);
            }
        }

        tracing::debug!("Browser session closed");
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        if !self.closed {
            tracing::warn!("Browser session dropped without close; aborting event task");
            self.events.abort();
        }
    }
}

/// Process-level shutdown steps of a Chrome instance
#[allow(async_fn_in_trait)]
trait ChromeProcess {
    /// Asks Chrome to exit over DevTools
    async fn request_close(&mut self) -> Result<(), String>;

    /// Kills the Chrome process
    async fn kill_process(&mut self) -> Result<(), String>;

    /// Waits for the Chrome process to exit
    async fn wait_exit(&mut self) -> Result<(), String>;
}

impl ChromeProcess for Browser {
    async fn request_close(&mut self) -> Result<(), String> {
        self.close().await.map(|_| ()).map_err(|e| e.to_string())
    }

    async fn kill_process(&mut self) -> Result<(), String> {
        match self.kill().await {
            Some(Err(e)) => Err(e.to_string()),
            _ => Ok(()),
        }
    }

    async fn wait_exit(&mut self) -> Result<(), String> {
        self.wait().await.map(|_| ()).map_err(|e| e.to_string())
    }
}

/// Closes Chrome, killing it when the close command fails, then waits for exit
///
/// A failed close can leave the process running, and waiting on it would
/// never return.
async fn shut_down<P: ChromeProcess>(process: &mut P) {
    if let Err(e) = process.request_close().await {
        tracing::warn!("Failed to close browser cleanly: {}; killing it", e);
        if let Err(e) = process.kill_process().await {
            tracing::warn!("Failed to kill browser: {}", e);
        }
    }

    if let Err(e) = process.wait_exit().await {
        tracing::warn!("Failed to wait for browser exit: {}", e);
    }
}

/// Fetches a rendered source: launch, navigate, settle, paginate, close
pub async fn fetch_rendered(
    profile: &SourceProfile,
    config: &FetcherConfig,
) -> Result<FetchOutput, HarvestError> {
    let mut session = BrowserSession::launch(config).await?;

    let result = drive_session(&session, profile, config).await;

    session.close().await;
    result
}

async fn drive_session(
    session: &BrowserSession,
    profile: &SourceProfile,
    config: &FetcherConfig,
) -> Result<FetchOutput, HarvestError> {
    tracing::debug!("[{}] navigating to {}", profile.name, profile.entry_url);
    let page = session.open(&profile.entry_url).await?;

    let wait = SettleWait::new(
        Duration::from_millis(config.settle_timeout_ms),
        Duration::from_millis(config.poll_interval_ms),
    );

    capture_pages(&page, profile, wait).await
}

/// JavaScript expression evaluating to the first element matched by a locator, or null
fn locate_js(locator: &Locator) -> String {
    match locator {
        Locator::Css(selector) => format!(
            "document.querySelector({})",
            serde_json::Value::from(selector.as_str())
        ),
        Locator::Xpath(expr) => format!(
            "document.evaluate({}, document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue",
            serde_json::Value::from(expr.as_str())
        ),
    }
}

fn browser_error(e: impl std::fmt::Display) -> HarvestError {
    HarvestError::Browser(e.to_string())
}

async fn evaluate_bool(page: &Page, script: String) -> Result<bool, HarvestError> {
    page.evaluate(script)
        .await
        .map_err(browser_error)?
        .into_value::<bool>()
        .map_err(browser_error)
}

impl PageDriver for Page {
    async fn html(&self) -> Result<String, HarvestError> {
        Page::content(self).await.map_err(browser_error)
    }

    async fn location(&self) -> Result<String, HarvestError> {
        Ok(Page::url(self)
            .await
            .map_err(browser_error)?
            .unwrap_or_default())
    }

    async fn is_present(&self, locator: &Locator) -> Result<bool, HarvestError> {
        evaluate_bool(self, format!("({}) !== null", locate_js(locator))).await
    }

    /// Clicks through script, as pagination controls are often covered by overlays
    async fn click(&self, locator: &Locator) -> Result<bool, HarvestError> {
        let script = format!(
            "(() => {{ const el = {}; if (!el) {{ return false; }} el.click(); return true; }})()",
            locate_js(locator)
        );
        evaluate_bool(self, script).await
    }
}
