use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

/// Main configuration structure for Folio-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default, rename = "source")]
    pub sources: Vec<SourceProfile>,
}

impl Config {
    /// Looks up a source profile by name (case-insensitive)
    pub fn find_source(&self, name: &str) -> Option<&SourceProfile> {
        self.sources
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }

    /// Path of the CSV export for a source
    pub fn tabular_path(&self, profile: &SourceProfile) -> PathBuf {
        PathBuf::from(&self.output.directory).join(format!("{}.csv", profile.tabular_stem()))
    }

    /// Canonical path of the DOCX report for a source
    pub fn report_path(&self, profile: &SourceProfile) -> PathBuf {
        PathBuf::from(&self.output.directory).join(format!("{}.docx", profile.document_stem()))
    }
}

/// Page fetching behaviour shared by all sources
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// User-Agent header sent with static fetches
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Timeout for a single HTTP request (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Upper bound for a rendered page to settle (milliseconds)
    #[serde(rename = "settle-timeout-ms")]
    pub settle_timeout_ms: u64,

    /// Interval between settle checks (milliseconds)
    #[serde(rename = "poll-interval-ms")]
    pub poll_interval_ms: u64,

    /// Run Chrome without a visible window
    pub headless: bool,

    /// Explicit Chrome/Chromium binary; auto-detected when unset
    #[serde(rename = "chrome-executable")]
    pub chrome_executable: Option<String>,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0".to_string(),
            request_timeout_secs: 30,
            settle_timeout_ms: 10_000,
            poll_interval_ms: 250,
            headless: true,
            chrome_executable: None,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving CSV exports and DOCX reports
    pub directory: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "output_files".to_string(),
        }
    }
}

/// How a source's pages must be loaded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Plain HTTP GET; the served HTML already contains the listing
    #[default]
    Static,
    /// The listing is built by page scripts and needs a headless browser
    Rendered,
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static => write!(f, "static"),
            Self::Rendered => write!(f, "rendered"),
        }
    }
}

/// Static description of one site
#[derive(Debug, Clone, Deserialize)]
pub struct SourceProfile {
    /// Unique identifier (e.g. "csis")
    pub name: String,

    /// Display name used as the report heading (e.g. "CSIS")
    pub title: String,

    /// Listing page the fetch starts from
    #[serde(rename = "entry-url")]
    pub entry_url: String,

    #[serde(rename = "render-mode", default)]
    pub render_mode: RenderMode,

    pub selectors: SelectorRules,

    #[serde(default)]
    pub pagination: PaginationRule,

    /// Maximum number of records kept per run
    #[serde(default)]
    pub limit: Option<usize>,

    /// CSS selector marking a rendered page as settled; defaults to the container selector
    #[serde(rename = "wait-for", default)]
    pub wait_for: Option<String>,

    /// CSV file stem; defaults to `name`
    #[serde(rename = "tabular-name", default)]
    pub tabular_name: Option<String>,

    /// DOCX file stem; defaults to `title`
    #[serde(rename = "document-name", default)]
    pub document_name: Option<String>,
}

impl SourceProfile {
    /// Base URL used to resolve relative links
    pub fn link_base(&self) -> &str {
        self.selectors
            .link_base
            .as_deref()
            .unwrap_or(&self.entry_url)
    }

    /// Selector whose presence means a rendered page has settled
    pub fn settle_selector(&self) -> &str {
        self.wait_for
            .as_deref()
            .unwrap_or(&self.selectors.container)
    }

    /// Returns true if records from this source carry a date column
    pub fn has_date(&self) -> bool {
        self.selectors.date.is_some()
    }

    pub fn tabular_stem(&self) -> &str {
        self.tabular_name.as_deref().unwrap_or(&self.name)
    }

    pub fn document_stem(&self) -> &str {
        self.document_name.as_deref().unwrap_or(&self.title)
    }
}

/// Field extraction rules for one source
///
/// `title`, `link` and `date` are field scopes: a CSS selector evaluated inside
/// the container, `:scope` for the container itself, or `closest(<css>)` for the
/// nearest matching ancestor of the container.
#[derive(Debug, Clone, Deserialize)]
pub struct SelectorRules {
    /// Selector matching one repeating listing element
    pub container: String,

    pub title: String,

    pub link: String,

    #[serde(default)]
    pub date: Option<String>,

    /// Attribute carrying the link target
    #[serde(rename = "link-attribute", default = "default_link_attribute")]
    pub link_attribute: String,

    /// Base for relative links; defaults to the entry URL
    #[serde(rename = "link-base", default)]
    pub link_base: Option<String>,
}

fn default_link_attribute() -> String {
    "href".to_string()
}

/// Reference to a clickable page control
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locator {
    Css(String),
    Xpath(String),
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(s) => write!(f, "css `{}`", s),
            Self::Xpath(s) => write!(f, "xpath `{}`", s),
        }
    }
}

/// How a source's listing spans more than one view
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum PaginationRule {
    /// Single page
    #[default]
    None,

    /// Click each page control in order, snapshotting every page
    NextPage { controls: Vec<Locator> },

    /// Expand one page by clicking a "show more" control, then snapshot once
    ClickUntilAbsent {
        control: Locator,
        #[serde(rename = "max-clicks")]
        max_clicks: u32,
    },
}
