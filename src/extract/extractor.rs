//! Record extraction from DOM snapshots
//!
//! A [`RecordExtractor`] compiles a profile's selectors once and then walks
//! every snapshot in fetch order, turning each matched container into a
//! [`Record`]. Malformed containers are skipped with a warning; they never
//! abort the extraction.

use crate::config::SourceProfile;
use crate::extract::scope::{compile, FieldScope};
use crate::record::{Record, Snapshot, NO_URL};
use crate::ConfigError;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Records extracted from a snapshot sequence, with skip counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Records in snapshot order, then document order
    pub records: Vec<Record>,

    /// Containers dropped because their title element was missing
    pub skipped: usize,

    /// Containers dropped because their title text was empty
    pub untitled: usize,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Why a single container produced no record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContainerSkip {
    TitleElementNotFound,
    EmptyTitle,
}

/// Extracts records for one source profile
#[derive(Debug)]
pub struct RecordExtractor<'p> {
    profile: &'p SourceProfile,
    container: Selector,
    title: FieldScope,
    link: FieldScope,
    date: Option<FieldScope>,
    base: Url,
}

impl<'p> RecordExtractor<'p> {
    /// Compiles the profile's selectors
    ///
    /// # Returns
    ///
    /// * `Ok(RecordExtractor)` - Selectors and link base are usable
    /// * `Err(ConfigError)` - A selector or the link base is invalid
    pub fn new(profile: &'p SourceProfile) -> Result<Self, ConfigError> {
        let rules = &profile.selectors;

        let base = Url::parse(profile.link_base()).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid link base '{}': {}", profile.link_base(), e))
        })?;

        Ok(Self {
            profile,
            container: compile(&rules.container)?,
            title: FieldScope::parse(&rules.title)?,
            link: FieldScope::parse(&rules.link)?,
            date: rules.date.as_deref().map(FieldScope::parse).transpose()?,
            base,
        })
    }

    /// Extracts records from every snapshot, preserving fetch and document order
    ///
    /// The same snapshots always yield the same records. No deduplication is
    /// performed: an entry listed on two pages produces two records.
    pub fn extract(&self, snapshots: &[Snapshot]) -> Extraction {
        let mut extraction = Extraction::default();

        for snapshot in snapshots {
            self.extract_snapshot(snapshot, &mut extraction);
            if self.limit_reached(&extraction) {
                break;
            }
        }

        if let Some(limit) = self.profile.limit {
            extraction.records.truncate(limit);
        }

        extraction
    }

    fn limit_reached(&self, extraction: &Extraction) -> bool {
        self.profile
            .limit
            .is_some_and(|limit| extraction.records.len() >= limit)
    }

    fn extract_snapshot(&self, snapshot: &Snapshot, extraction: &mut Extraction) {
        let document = Html::parse_document(&snapshot.html);
        let mut matched = 0;

        for (index, container) in document.select(&self.container).enumerate() {
            matched += 1;

            match self.extract_container(container) {
                Ok(record) => extraction.records.push(record),
                Err(ContainerSkip::TitleElementNotFound) => {
                    tracing::warn!(
                        "[{}] page {}: container #{} has no element for title rule '{}', skipping",
                        self.profile.name,
                        snapshot.page_index,
                        index,
                        self.profile.selectors.title
                    );
                    extraction.skipped += 1;
                }
                Err(ContainerSkip::EmptyTitle) => {
                    tracing::debug!(
                        "[{}] page {}: container #{} has an empty title, skipping",
                        self.profile.name,
                        snapshot.page_index,
                        index
                    );
                    extraction.untitled += 1;
                }
            }

            if self.limit_reached(extraction) {
                break;
            }
        }

        tracing::debug!(
            "[{}] page {} ({}): {} containers matched",
            self.profile.name,
            snapshot.page_index,
            snapshot.url,
            matched
        );
    }

    fn extract_container(&self, container: ElementRef<'_>) -> Result<Record, ContainerSkip> {
        let title_element = self
            .title
            .locate(container)
            .ok_or(ContainerSkip::TitleElementNotFound)?;

        let title = element_text(title_element);
        if title.is_empty() {
            return Err(ContainerSkip::EmptyTitle);
        }

        let url = self
            .link
            .locate(container)
            .and_then(|element| element.value().attr(&self.profile.selectors.link_attribute))
            .and_then(|href| resolve_link(href, &self.base))
            .unwrap_or_else(|| NO_URL.to_string());

        let date = self
            .date
            .as_ref()
            .and_then(|scope| scope.locate(container))
            .map(element_text)
            .filter(|text| !text.is_empty());

        Ok(Record {
            source: self.profile.name.clone(),
            title,
            url,
            date,
        })
    }
}

/// Extracts records with a freshly compiled extractor
///
/// # Arguments
///
/// * `snapshots` - DOM snapshots in fetch order
/// * `profile` - The source profile supplying selectors and link base
///
/// # Example
///
/// ```no_run
/// use folio_harvest::config::builtin_config;
/// use folio_harvest::extract::extract;
/// use folio_harvest::Snapshot;
///
/// let (config, _) = builtin_config().unwrap();
/// let profile = config.find_source("quincy").unwrap();
/// let html = std::fs::read_to_string("quincy.html").unwrap();
/// let extraction = extract(&[Snapshot::new(&profile.entry_url, 0, html)], profile).unwrap();
/// println!("{} records", extraction.records.len());
/// ```
pub fn extract(snapshots: &[Snapshot], profile: &SourceProfile) -> Result<Extraction, ConfigError> {
    Ok(RecordExtractor::new(profile)?.extract(snapshots))
}

/// Text content of an element with runs of whitespace collapsed to one space
fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

/// Collapses runs of whitespace to single spaces and trims both ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Resolves a link href to an absolute http(s) URL
///
/// Returns None for empty hrefs, same-page fragments, script/mail/tel/data
/// links and anything that does not resolve to http or https.
fn resolve_link(href: &str, base: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base.join(href) {
        Ok(absolute) if absolute.scheme() == "http" || absolute.scheme() == "https" => {
            Some(absolute.to_string())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PaginationRule, RenderMode, SelectorRules};

    fn profile(entry_url: &str, container: &str, title: &str, link: &str) -> SourceProfile {
        SourceProfile {
            name: "test".to_string(),
            title: "Test".to_string(),
            entry_url: entry_url.to_string(),
            render_mode: RenderMode::Static,
            selectors: SelectorRules {
                container: container.to_string(),
                title: title.to_string(),
                link: link.to_string(),
                date: None,
                link_attribute: "href".to_string(),
                link_base: None,
            },
            pagination: PaginationRule::None,
            limit: None,
            wait_for: None,
            tabular_name: None,
            document_name: None,
        }
    }

    fn card_profile() -> SourceProfile {
        profile("https://t.org/list", ".card", "h2", "a")
    }

    fn snapshot(html: &str) -> Snapshot {
        Snapshot::new("https://t.org/list", 0, html)
    }

    const TWO_CARDS: &str = r#"
        <html><body>
          <div class="card"><h2>First   paper</h2><a href="/papers/1">Read</a></div>
          <div class="card"><h2>
              Second paper
          </h2><a href="https://other.org/p/2">Read</a></div>
        </body></html>
    "#;

    #[test]
    fn test_extracts_cards_in_order() {
        let profile = card_profile();
        let extraction = extract(&[snapshot(TWO_CARDS)], &profile).unwrap();

        assert_eq!(extraction.records.len(), 2);
        assert_eq!(extraction.records[0].title, "First paper");
        assert_eq!(extraction.records[0].url, "https://t.org/papers/1");
        assert_eq!(extraction.records[1].title, "Second paper");
        assert_eq!(extraction.records[1].url, "https://other.org/p/2");
        assert!(extraction.records.iter().all(|r| r.source == "test"));
        assert!(extraction.records.iter().all(|r| r.date.is_none()));
    }

    #[test]
    fn test_relative_link_resolution() {
        let profile = profile("https://example.org/research", ".item", "h3", "a");
        let html = r#"<div class="item"><h3>Five</h3><a href="/item/5">x</a></div>"#;

        let extraction = extract(&[snapshot(html)], &profile).unwrap();
        assert_eq!(extraction.records[0].url, "https://example.org/item/5");
    }

    #[test]
    fn test_link_base_overrides_entry_url() {
        let mut profile = card_profile();
        profile.selectors.link_base = Some("https://www.hudson.org".to_string());
        let html = r#"<div class="card"><h2>T</h2><a href="/research/1">x</a></div>"#;

        let extraction = extract(&[snapshot(html)], &profile).unwrap();
        assert_eq!(extraction.records[0].url, "https://www.hudson.org/research/1");
    }

    #[test]
    fn test_empty_title_filtered() {
        let profile = card_profile();
        let html = r#"
            <div class="card"><h2>   </h2><a href="/a">x</a></div>
            <div class="card"><h2>Kept</h2><a href="/b">x</a></div>
        "#;

        let extraction = extract(&[snapshot(html)], &profile).unwrap();
        assert_eq!(extraction.records.len(), 1);
        assert_eq!(extraction.records[0].title, "Kept");
        assert_eq!(extraction.untitled, 1);
        assert_eq!(extraction.skipped, 0);
    }

    #[test]
    fn test_missing_title_element_skipped() {
        let profile = card_profile();
        let html = r#"
            <div class="card"><p>no heading</p><a href="/a">x</a></div>
            <div class="card"><h2>Kept</h2><a href="/b">x</a></div>
        "#;

        let extraction = extract(&[snapshot(html)], &profile).unwrap();
        assert_eq!(extraction.records.len(), 1);
        assert_eq!(extraction.skipped, 1);
    }

    #[test]
    fn test_missing_link_uses_sentinel() {
        let profile = card_profile();
        let html = r#"
            <div class="card"><h2>No anchor</h2></div>
            <div class="card"><h2>No href</h2><a>x</a></div>
            <div class="card"><h2>Script</h2><a href="javascript:void(0)">x</a></div>
        "#;

        let extraction = extract(&[snapshot(html)], &profile).unwrap();
        assert_eq!(extraction.records.len(), 3);
        assert!(extraction.records.iter().all(|r| r.url == NO_URL));
    }

    #[test]
    fn test_ancestor_link_and_self_title() {
        let profile = profile(
            "https://www.fdd.org/category/analysis/",
            "h4.post-title",
            ":scope",
            "closest(a[href])",
        );
        let html = r#"
            <a href="/analysis/2025/01/01/one/"><div><h4 class="post-title">One</h4></div></a>
            <div><h4 class="post-title">Orphan</h4></div>
        "#;

        let extraction = extract(&[snapshot(html)], &profile).unwrap();
        assert_eq!(extraction.records.len(), 2);
        assert_eq!(
            extraction.records[0].url,
            "https://www.fdd.org/analysis/2025/01/01/one/"
        );
        assert_eq!(extraction.records[1].url, NO_URL);
    }

    #[test]
    fn test_date_field() {
        let mut profile = profile(
            "https://www.mei.edu/policy-analysis",
            "article.feature",
            "h4 a",
            "h4 a",
        );
        profile.selectors.date = Some("span.feature__date".to_string());
        let html = r#"
            <article class="feature"><h4><a href="/a">A</a></h4><span class="feature__date">Jan  2, 2025</span></article>
            <article class="feature"><h4><a href="/b">B</a></h4></article>
        "#;

        let extraction = extract(&[snapshot(html)], &profile).unwrap();
        assert_eq!(extraction.records[0].date.as_deref(), Some("Jan 2, 2025"));
        assert_eq!(extraction.records[1].date, None);
    }

    #[test]
    fn test_order_across_snapshots_without_dedup() {
        let profile = card_profile();
        let page1 = Snapshot::new("https://t.org/list", 0, r#"<div class="card"><h2>A</h2><a href="/a">x</a></div>"#);
        let page2 = Snapshot::new(
            "https://t.org/list",
            1,
            r#"<div class="card"><h2>B</h2><a href="/b">x</a></div><div class="card"><h2>A</h2><a href="/a">x</a></div>"#,
        );

        let extraction = extract(&[page1, page2], &profile).unwrap();
        let titles: Vec<_> = extraction.records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B", "A"]);
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let profile = card_profile();
        let snapshots = vec![snapshot(TWO_CARDS), snapshot(TWO_CARDS)];
        let extractor = RecordExtractor::new(&profile).unwrap();

        assert_eq!(extractor.extract(&snapshots), extractor.extract(&snapshots));
    }

    #[test]
    fn test_limit_truncates() {
        let mut profile = card_profile();
        profile.limit = Some(1);

        let extraction = extract(&[snapshot(TWO_CARDS), snapshot(TWO_CARDS)], &profile).unwrap();
        assert_eq!(extraction.records.len(), 1);
        assert_eq!(extraction.records[0].title, "First paper");
    }

    #[test]
    fn test_no_matches_is_empty() {
        let profile = card_profile();
        let extraction = extract(&[snapshot("<html><body></body></html>")], &profile).unwrap();
        assert!(extraction.is_empty());
    }

    #[test]
    fn test_custom_link_attribute() {
        let mut profile = card_profile();
        profile.selectors.link_attribute = "data-href".to_string();
        let html = r#"<div class="card"><h2>T</h2><a data-href="/x">x</a></div>"#;

        let extraction = extract(&[snapshot(html)], &profile).unwrap();
        assert_eq!(extraction.records[0].url, "https://t.org/x");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\t b  "), "a b");
        assert_eq!(collapse_whitespace("   "), "");
    }
}
