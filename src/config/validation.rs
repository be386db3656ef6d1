use crate::config::types::{Config, FetcherConfig, Locator, PaginationRule, RenderMode, SourceProfile};
use crate::extract::{compile_selector, FieldScope};
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_fetcher_config(&config.fetcher)?;

    if config.output.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for source in &config.sources {
        validate_source(source)?;
        if !seen.insert(source.name.to_ascii_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "Duplicate source name '{}'",
                source.name
            )));
        }
    }

    Ok(())
}

/// Validates fetcher configuration
fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    if config.poll_interval_ms < 10 {
        return Err(ConfigError::Validation(format!(
            "poll_interval_ms must be >= 10ms, got {}ms",
            config.poll_interval_ms
        )));
    }

    if config.settle_timeout_ms < config.poll_interval_ms {
        return Err(ConfigError::Validation(format!(
            "settle_timeout_ms ({}ms) must not be shorter than poll_interval_ms ({}ms)",
            config.settle_timeout_ms, config.poll_interval_ms
        )));
    }

    Ok(())
}

/// Validates a single source profile
pub fn validate_source(source: &SourceProfile) -> Result<(), ConfigError> {
    validate_source_name(&source.name)?;

    if source.title.trim().is_empty() {
        return Err(ConfigError::Validation(format!(
            "Source '{}' must have a non-empty title",
            source.name
        )));
    }

    validate_http_url(&source.entry_url, "entry-url")?;
    if let Some(base) = &source.selectors.link_base {
        validate_http_url(base, "link-base")?;
    }

    validate_css(&source.selectors.container)?;
    FieldScope::parse(&source.selectors.title)?;
    FieldScope::parse(&source.selectors.link)?;
    if let Some(date) = &source.selectors.date {
        FieldScope::parse(date)?;
    }
    if let Some(wait_for) = &source.wait_for {
        validate_css(wait_for)?;
    }

    if source.selectors.link_attribute.trim().is_empty() {
        return Err(ConfigError::Validation(format!(
            "Source '{}' has an empty link-attribute",
            source.name
        )));
    }

    if source.limit == Some(0) {
        return Err(ConfigError::Validation(format!(
            "Source '{}' limit must be >= 1",
            source.name
        )));
    }

    validate_pagination(source)?;

    Ok(())
}

/// Pagination drives a live page, so it needs the rendered mode
fn validate_pagination(source: &SourceProfile) -> Result<(), ConfigError> {
    if source.pagination != PaginationRule::None && source.render_mode != RenderMode::Rendered {
        return Err(ConfigError::Validation(format!(
            "Source '{}' paginates but its render-mode is '{}'; pagination requires 'rendered'",
            source.name, source.render_mode
        )));
    }

    match &source.pagination {
        PaginationRule::None => {}
        PaginationRule::NextPage { controls } => {
            if controls.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "Source '{}' next-page pagination needs at least one control",
                    source.name
                )));
            }
            for control in controls {
                validate_locator(control)?;
            }
        }
        PaginationRule::ClickUntilAbsent {
            control,
            max_clicks,
        } => {
            if *max_clicks < 1 {
                return Err(ConfigError::Validation(format!(
                    "Source '{}' max-clicks must be >= 1, got {}",
                    source.name, max_clicks
                )));
            }
            validate_locator(control)?;
        }
    }

    Ok(())
}

/// XPath expressions are evaluated by the browser, so only emptiness is checked here
fn validate_locator(locator: &Locator) -> Result<(), ConfigError> {
    match locator {
        Locator::Css(selector) => validate_css(selector),
        Locator::Xpath(expr) if expr.trim().is_empty() => Err(ConfigError::InvalidSelector(
            "XPath locator cannot be empty".to_string(),
        )),
        Locator::Xpath(_) => Ok(()),
    }
}

fn validate_css(selector: &str) -> Result<(), ConfigError> {
    compile_selector(selector).map(|_| ())
}

fn validate_http_url(raw: &str, field: &str) -> Result<(), ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, raw, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            field, raw
        )));
    }

    Ok(())
}

/// Source names are used on the command line: lowercase alphanumerics and hyphens
fn validate_source_name(name: &str) -> Result<(), ConfigError> {
    if name.is_empty() {
        return Err(ConfigError::Validation(
            "source name cannot be empty".to_string(),
        ));
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "source name must contain only lowercase letters, digits and hyphens, got '{}'",
            name
        )));
    }

    if name.starts_with('-') || name.ends_with('-') {
        return Err(ConfigError::Validation(format!(
            "source name '{}' cannot start or end with '-'",
            name
        )));
    }

    Ok(())
}
