//! Settle waits and pagination over a live page
//!
//! Everything here is written against [`PageDriver`], so the same logic runs
//! on a Chrome tab in production and on an in-memory page in tests.

use crate::config::{Locator, PaginationRule, SourceProfile};
use crate::fetch::{FetchOutput, FetchWarning};
use crate::record::Snapshot;
use crate::HarvestError;
use std::time::Duration;
use tokio::time::Instant;

/// Operations the pagination engine needs from a loaded page
#[allow(async_fn_in_trait)]
pub trait PageDriver {
    /// Serialized HTML of the current DOM
    async fn html(&self) -> Result<String, HarvestError>;

    /// URL of the current document
    async fn location(&self) -> Result<String, HarvestError>;

    /// Returns true if the locator currently matches an element
    async fn is_present(&self, locator: &Locator) -> Result<bool, HarvestError>;

    /// Clicks the first element matching the locator
    ///
    /// Returns false, without error, when nothing matches.
    async fn click(&self, locator: &Locator) -> Result<bool, HarvestError>;
}

/// Bounds for waiting on client-side rendering
#[derive(Debug, Clone, Copy)]
pub struct SettleWait {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl SettleWait {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }
}

/// Result of a bounded settle wait
#[derive(Debug)]
enum Settle {
    Ready(String),
    TimedOut(String),
}

/// Polls until the settle selector is present and, when a baseline is given,
/// the DOM differs from it. Returns the last observed HTML either way.
async fn wait_for_settle<D: PageDriver>(
    driver: &D,
    settle: &Locator,
    baseline: Option<&str>,
    wait: SettleWait,
) -> Result<Settle, HarvestError> {
    let deadline = Instant::now() + wait.timeout;

    loop {
        let html = driver.html().await?;
        let changed = baseline.map_or(true, |previous| previous != html);

        if changed && driver.is_present(settle).await? {
            return Ok(Settle::Ready(html));
        }

        if Instant::now() >= deadline {
            return Ok(Settle::TimedOut(html));
        }

        tokio::time::sleep(wait.poll_interval).await;
    }
}

/// Waits for the page to settle, recording a `RenderTimeout` warning on expiry
async fn settle_or_warn<D: PageDriver>(
    driver: &D,
    profile: &SourceProfile,
    baseline: Option<&str>,
    wait: SettleWait,
    stage: &str,
    warnings: &mut Vec<FetchWarning>,
) -> Result<String, HarvestError> {
    let settle = Locator::Css(profile.settle_selector().to_string());

    match wait_for_settle(driver, &settle, baseline, wait).await? {
        Settle::Ready(html) => Ok(html),
        Settle::TimedOut(html) => {
            let warning = FetchWarning::RenderTimeout {
                stage: stage.to_string(),
                waited_ms: wait.timeout.as_millis() as u64,
            };
            tracing::warn!("[{}] {}; continuing with current DOM", profile.name, warning);
            warnings.push(warning);
            Ok(html)
        }
    }
}

/// Captures snapshots of a loaded page according to the profile's pagination rule
///
/// # Pagination
///
/// | Rule | Snapshots |
/// |------|-----------|
/// | `None` | the settled entry page |
/// | `NextPage` | entry page, then one per control clicked; stops at the first absent control |
/// | `ClickUntilAbsent` | exactly one, after up to `max_clicks` expansions |
pub async fn capture_pages<D: PageDriver>(
    driver: &D,
    profile: &SourceProfile,
    wait: SettleWait,
) -> Result<FetchOutput, HarvestError> {
    let mut output = FetchOutput::default();

    let first = settle_or_warn(driver, profile, None, wait, "initial load", &mut output.warnings)
        .await?;
    let location = driver.location().await?;

    match &profile.pagination {
        PaginationRule::None => {
            output.snapshots.push(Snapshot::new(location, 0, first));
        }

        PaginationRule::NextPage { controls } => {
            output.snapshots.push(Snapshot::new(location, 0, first));

            for (offset, control) in controls.iter().enumerate() {
                let page_index = offset + 1;

                if !driver.click(control).await? {
                    let warning = FetchWarning::PaginationControlAbsent {
                        control: control.to_string(),
                        page_index,
                    };
                    tracing::warn!(
                        "[{}] {}; keeping {} page(s)",
                        profile.name,
                        warning,
                        output.snapshots.len()
                    );
                    output.warnings.push(warning);
                    break;
                }

                let previous = output
                    .snapshots
                    .last()
                    .map(|s| s.html.clone())
                    .unwrap_or_default();
                let stage = format!("page {}", page_index);
                let html = settle_or_warn(
                    driver,
                    profile,
                    Some(&previous),
                    wait,
                    &stage,
                    &mut output.warnings,
                )
                .await?;

                tracing::debug!("[{}] captured page {}", profile.name, page_index);
                output
                    .snapshots
                    .push(Snapshot::new(driver.location().await?, page_index, html));
            }
        }

        PaginationRule::ClickUntilAbsent {
            control,
            max_clicks,
        } => {
            let mut current = first;
            let mut clicks = 0;

            while clicks < *max_clicks {
                if !driver.click(control).await? {
                    tracing::info!(
                        "[{}] {} gone after {} click(s)",
                        profile.name,
                        control,
                        clicks
                    );
                    break;
                }
                clicks += 1;

                let stage = format!("expansion {}", clicks);
                current = settle_or_warn(
                    driver,
                    profile,
                    Some(&current),
                    wait,
                    &stage,
                    &mut output.warnings,
                )
                .await?;
            }

            output
                .snapshots
                .push(Snapshot::new(driver.location().await?, 0, current));
        }
    }

    Ok(output)
}
