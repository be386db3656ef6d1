//! Source runs: fetch, extract, write artifacts
//!
//! One run handles one source profile end to end. Runs are strictly
//! sequential; `run_all` moves on to the next source when one fails.

use crate::config::{Config, SourceProfile};
use crate::extract::RecordExtractor;
use crate::fetch::{fetch, FetchWarning};
use crate::output::{compose, remove_artifact, write_records};
use crate::record::Record;
use crate::HarvestError;
use chrono::{DateTime, Utc};
use std::fmt;
use std::fs;
use std::path::PathBuf;

/// How complete a finished run's results are
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunStatus {
    /// Every page was captured and at least one record extracted
    Complete,

    /// Records were extracted, but pagination stopped early or a render wait timed out
    Partial,

    /// Pages were captured but no records came out of them
    Empty,
}

impl RunStatus {
    /// Derives the status from the record count and fetch warnings
    pub fn classify(record_count: usize, warnings: &[FetchWarning]) -> Self {
        if record_count == 0 {
            Self::Empty
        } else if warnings.is_empty() {
            Self::Complete
        } else {
            Self::Partial
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::Partial => "partial",
            Self::Empty => "empty",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Observable result of one source run
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub source: String,
    pub status: RunStatus,
    pub records: Vec<Record>,
    /// Number of snapshots captured
    pub pages: usize,
    /// Containers skipped for a missing title element
    pub skipped: usize,
    pub warnings: Vec<FetchWarning>,
    pub tabular_path: PathBuf,
    pub report_path: PathBuf,
    pub config_hash: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunOutcome {
    /// Wall-clock duration of the run in milliseconds
    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}

/// Runs the source named `name`
///
/// # Returns
///
/// * `Ok(RunOutcome)` - Artifacts were written (possibly empty)
/// * `Err(HarvestError::UnknownSource)` - No profile with that name
/// * `Err(HarvestError)` - Fetch or output failure; no artifacts for the
///   source remain on disk
pub async fn run_source(
    config: &Config,
    config_hash: &str,
    name: &str,
) -> Result<RunOutcome, HarvestError> {
    let profile = config
        .find_source(name)
        .ok_or_else(|| HarvestError::UnknownSource(name.to_string()))?;

    run_profile(config, config_hash, profile).await
}

/// Runs a single profile
///
/// A failed run leaves neither artifact behind: files from an earlier run of
/// the same source are removed so they cannot be mistaken for this run's output.
pub async fn run_profile(
    config: &Config,
    config_hash: &str,
    profile: &SourceProfile,
) -> Result<RunOutcome, HarvestError> {
    let result = harvest(config, config_hash, profile).await;

    if result.is_err() {
        discard_artifacts(config, profile);
    }

    result
}

fn discard_artifacts(config: &Config, profile: &SourceProfile) {
    for path in [config.tabular_path(profile), config.report_path(profile)] {
        match remove_artifact(&path) {
            Ok(true) => tracing::info!(
                "[{}] removed stale artifact {}",
                profile.name,
                path.display()
            ),
            Ok(false) => {}
            Err(e) => tracing::warn!(
                "[{}] failed to remove {}: {}",
                profile.name,
                path.display(),
                e
            ),
        }
    }
}

async fn harvest(
    config: &Config,
    config_hash: &str,
    profile: &SourceProfile,
) -> Result<RunOutcome, HarvestError> {
    let started_at = Utc::now();
    tracing::info!(
        "[{}] starting {} run for {}",
        profile.name,
        profile.render_mode,
        profile.entry_url
    );

    // Selector errors surface before any network traffic
    let extractor = RecordExtractor::new(profile)?;

    let fetched = fetch(profile, &config.fetcher).await?;
    tracing::info!(
        "[{}] captured {} page(s)",
        profile.name,
        fetched.snapshots.len()
    );

    let extraction = extractor.extract(&fetched.snapshots);
    let status = RunStatus::classify(extraction.records.len(), &fetched.warnings);
    if status == RunStatus::Empty {
        tracing::warn!(
            "[{}] no records extracted from {} page(s)",
            profile.name,
            fetched.snapshots.len()
        );
    }

    fs::create_dir_all(&config.output.directory)?;

    let tabular_path = config.tabular_path(profile);
    write_records(&extraction.records, &tabular_path, profile.has_date())?;

    let report_path = config.report_path(profile);
    compose(&extraction.records, &profile.title).save(&report_path)?;

    let finished_at = Utc::now();
    let outcome = RunOutcome {
        source: profile.name.clone(),
        status,
        records: extraction.records,
        pages: fetched.snapshots.len(),
        skipped: extraction.skipped,
        warnings: fetched.warnings,
        tabular_path,
        report_path,
        config_hash: config_hash.to_string(),
        started_at,
        finished_at,
    };

    tracing::info!(
        "[{}] {}: {} records, {} skipped, {} warning(s) in {}ms",
        outcome.source,
        outcome.status,
        outcome.records.len(),
        outcome.skipped,
        outcome.warnings.len(),
        outcome.duration_ms()
    );

    Ok(outcome)
}

/// Runs every configured source in order, continuing past failures
pub async fn run_all(
    config: &Config,
    config_hash: &str,
) -> Vec<(String, Result<RunOutcome, HarvestError>)> {
    let mut results = Vec::with_capacity(config.sources.len());

    for profile in &config.sources {
        let result = run_profile(config, config_hash, profile).await;
        if let Err(e) = &result {
            tracing::error!("[{}] run failed: {}", profile.name, e);
        }
        results.push((profile.name.clone(), result));
    }

    results
}
