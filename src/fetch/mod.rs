//! Page fetching for source profiles
//!
//! This module turns a profile into DOM snapshots:
//! - Static sources: one HTTP GET
//! - Rendered sources: headless Chrome with bounded settle waits
//! - Pagination: next-page controls or "show more" expansion

mod browser;
mod driver;
mod http;

pub use browser::{fetch_rendered, BrowserSession};
pub use driver::{capture_pages, PageDriver, SettleWait};
pub use http::{build_http_client, fetch_static};

use crate::config::{FetcherConfig, RenderMode, SourceProfile};
use crate::record::Snapshot;
use crate::HarvestError;
use std::fmt;

/// Recoverable conditions met while fetching
///
/// These never abort a run; they mark its result as possibly incomplete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchWarning {
    /// A next-page control was missing; pagination stopped before `page_index`
    PaginationControlAbsent { control: String, page_index: usize },

    /// A rendered page did not settle in time; its DOM was captured as-is
    RenderTimeout { stage: String, waited_ms: u64 },
}

impl fmt::Display for FetchWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PaginationControlAbsent {
                control,
                page_index,
            } => write!(
                f,
                "pagination control {} for page {} not found",
                control, page_index
            ),
            Self::RenderTimeout { stage, waited_ms } => {
                write!(f, "render timeout at {} after {}ms", stage, waited_ms)
            }
        }
    }
}

/// Snapshots captured for one source, in fetch order
#[derive(Debug, Clone, Default)]
pub struct FetchOutput {
    pub snapshots: Vec<Snapshot>,
    pub warnings: Vec<FetchWarning>,
}

/// Fetches every page a profile describes
///
/// # Returns
///
/// * `Ok(FetchOutput)` - At least one snapshot, plus any recoverable warnings
/// * `Err(HarvestError)` - The entry page could not be fetched or the browser failed
pub async fn fetch(
    profile: &SourceProfile,
    config: &FetcherConfig,
) -> Result<FetchOutput, HarvestError> {
    match profile.render_mode {
        RenderMode::Static => {
            let client = build_http_client(config)
                .map_err(|e| HarvestError::fetch_failed(&profile.entry_url, e))?;
            let snapshot = fetch_static(&client, profile).await?;

            Ok(FetchOutput {
                snapshots: vec![snapshot],
                warnings: Vec::new(),
            })
        }
        RenderMode::Rendered => fetch_rendered(profile, config).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_display() {
        let absent = FetchWarning::PaginationControlAbsent {
            control: "css `a.next`".to_string(),
            page_index: 2,
        };
        assert_eq!(
            absent.to_string(),
            "pagination control css `a.next` for page 2 not found"
        );

        let timeout = FetchWarning::RenderTimeout {
            stage: "initial load".to_string(),
            waited_ms: 10_000,
        };
        assert_eq!(
            timeout.to_string(),
            "render timeout at initial load after 10000ms"
        );
    }
}
