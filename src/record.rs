//! Normalized listing records and the DOM snapshots they are extracted from

use serde::{Deserialize, Serialize};

/// Placeholder URL for a listing entry whose link could not be found or resolved
pub const NO_URL: &str = "no URL found";

/// One publication listing entry, normalized across sources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Name of the source profile that produced this record
    pub source: String,

    /// Publication title, whitespace-collapsed and never empty
    pub title: String,

    /// Absolute URL, or [`NO_URL`]
    pub url: String,

    /// Raw date text as shown on the listing page
    pub date: Option<String>,
}

impl Record {
    /// Returns true if the record carries a resolved link
    pub fn has_url(&self) -> bool {
        self.url != NO_URL
    }
}

/// A captured DOM state at one point of a fetch/pagination sequence
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// URL the page was loaded from (the page's own URL after navigation)
    pub url: String,

    /// Zero-based position in the fetch sequence
    pub page_index: usize,

    /// Serialized HTML of the page
    pub html: String,
}

impl Snapshot {
    pub fn new(url: impl Into<String>, page_index: usize, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            page_index,
            html: html.into(),
        }
    }
}
