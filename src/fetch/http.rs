//! Static page fetching over plain HTTP
//!
//! Static sources serve their listing in the initial HTML, so one GET with a
//! browser-like User-Agent is enough. No retries are attempted: a failed
//! request fails the source's run.

use crate::config::{FetcherConfig, SourceProfile};
use crate::record::Snapshot;
use crate::HarvestError;
use reqwest::Client;
use std::time::Duration;

/// Builds an HTTP client with the configured User-Agent and timeouts
///
/// # Example
///
/// ```no_run
/// use folio_harvest::config::FetcherConfig;
/// use folio_harvest::fetch::build_http_client;
///
/// let client = build_http_client(&FetcherConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a static source's entry page as a single snapshot
///
/// # Returns
///
/// * `Ok(Snapshot)` - The page body, tagged with the final URL after redirects
/// * `Err(HarvestError::FetchFailed)` - Transport error or non-success status
pub async fn fetch_static(client: &Client, profile: &SourceProfile) -> Result<Snapshot, HarvestError> {
    let url = profile.entry_url.as_str();
    tracing::debug!("[{}] GET {}", profile.name, url);

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            HarvestError::fetch_failed(url, "request timeout")
        } else if e.is_connect() {
            HarvestError::fetch_failed(url, format!("connection failed: {}", e))
        } else {
            HarvestError::fetch_failed(url, e)
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(HarvestError::fetch_failed(
            url,
            format!("HTTP status {}", status.as_u16()),
        ));
    }

    let final_url = response.url().to_string();
    let body = response
        .text()
        .await
        .map_err(|e| HarvestError::fetch_failed(url, e))?;

    tracing::debug!(
        "[{}] fetched {} ({} bytes)",
        profile.name,
        final_url,
        body.len()
    );

    Ok(Snapshot::new(final_url, 0, body))
}
