//! Folio-Harvest: publication listings from institutional websites
//!
//! This crate fetches research listing pages (plain HTTP or headless Chrome),
//! extracts title/link/date records through declarative source profiles, and
//! writes each source's records to a CSV export and a DOCX report whose titles
//! are live hyperlinks.

pub mod config;
pub mod extract;
pub mod fetch;
pub mod output;
pub mod pipeline;
pub mod record;

use thiserror::Error;

/// Main error type for Folio-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch failed for {url}: {reason}")]
    FetchFailed { url: String, reason: String },

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Unknown source: {0}")]
    UnknownSource(String),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl HarvestError {
    /// Builds a `FetchFailed` error from any displayable cause
    pub fn fetch_failed(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::FetchFailed {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),
}

/// Result type alias for Folio-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{Config, SourceProfile};
pub use pipeline::{run_source, RunOutcome, RunStatus};
pub use record::{Record, Snapshot, NO_URL};
