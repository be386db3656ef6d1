//! Folio-Harvest main entry point
//!
//! This is the command-line interface for harvesting publication listings.

use anyhow::Context;
use clap::Parser;
use folio_harvest::config::{builtin_config, load_config_with_hash, Config, PaginationRule};
use folio_harvest::pipeline::{run_all, run_source, RunOutcome};
use folio_harvest::HarvestError;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Folio-Harvest: publication listings to CSV and DOCX
///
/// Fetches the research listing of a configured source, extracts titles and
/// links, and writes a CSV export plus a DOCX report with clickable titles.
#[derive(Parser, Debug)]
#[command(name = "folio-harvest")]
#[command(version)]
#[command(about = "Harvests publication listings into CSV and DOCX reports", long_about = None)]
struct Cli {
    /// Source profile to harvest (see --list)
    #[arg(
        value_name = "SOURCE",
        required_unless_present_any = ["all", "list", "dry_run"],
        conflicts_with_all = ["all", "list"]
    )]
    source: Option<String>,

    /// Path to a TOML configuration file (defaults to the built-in profiles)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Harvest every configured source in turn
    #[arg(long, conflicts_with = "list")]
    all: bool,

    /// List configured sources and exit
    #[arg(long, conflicts_with = "dry_run")]
    list: bool,

    /// Validate config and show what would be harvested without fetching
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let (config, config_hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config_with_hash(path)
                .with_context(|| format!("failed to load configuration from {}", path.display()))?
        }
        None => builtin_config().context("built-in configuration is invalid")?,
    };
    tracing::info!(
        "Configuration loaded: {} sources (hash: {})",
        config.sources.len(),
        config_hash
    );

    if cli.list {
        handle_list(&config);
        return Ok(ExitCode::SUCCESS);
    }

    if cli.dry_run {
        handle_dry_run(&config, cli.source.as_deref())?;
        return Ok(ExitCode::SUCCESS);
    }

    let results = if cli.all {
        run_all(&config, &config_hash).await
    } else {
        let name = cli.source.unwrap_or_default();
        let result = run_source(&config, &config_hash, &name).await;
        if let Err(e) = &result {
            tracing::error!("[{}] run failed: {}", name, e);
        }
        vec![(name, result)]
    };

    Ok(report(&results))
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("folio_harvest=info,warn"),
            1 => EnvFilter::new("folio_harvest=debug,info"),
            2 => EnvFilter::new("folio_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles --list: one line per source
fn handle_list(config: &Config) {
    for source in &config.sources {
        println!("{:<18} {:<9} {}", source.name, source.render_mode, source.title);
    }
}

/// Handles --dry-run: shows the plan for one source, or all of them
fn handle_dry_run(config: &Config, source: Option<&str>) -> anyhow::Result<()> {
    let profiles = match source {
        Some(name) => vec![config
            .find_source(name)
            .ok_or_else(|| HarvestError::UnknownSource(name.to_string()))?],
        None => config.sources.iter().collect(),
    };

    println!("=== Folio-Harvest Dry Run ===\n");
    println!("Fetcher:");
    println!("  User agent: {}", config.fetcher.user_agent);
    println!("  Request timeout: {}s", config.fetcher.request_timeout_secs);
    println!("  Settle timeout: {}ms", config.fetcher.settle_timeout_ms);
    println!("  Headless: {}", config.fetcher.headless);
    println!("\nOutput directory: {}", config.output.directory);

    for profile in profiles {
        println!("\n{} ({})", profile.title, profile.name);
        println!("  Entry URL: {}", profile.entry_url);
        println!("  Render mode: {}", profile.render_mode);
        match &profile.pagination {
            PaginationRule::None => println!("  Pagination: none"),
            PaginationRule::NextPage { controls } => {
                println!("  Pagination: {} next-page control(s)", controls.len());
                for control in controls {
                    println!("    * {}", control);
                }
            }
            PaginationRule::ClickUntilAbsent {
                control,
                max_clicks,
            } => println!(
                "  Pagination: click {} up to {} times",
                control, max_clicks
            ),
        }
        if let Some(limit) = profile.limit {
            println!("  Limit: {}", limit);
        }
        println!("  CSV: {}", config.tabular_path(profile).display());
        println!("  Report: {}", config.report_path(profile).display());
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Prints the report path of each successful run; failure if any run failed
fn report(results: &[(String, Result<RunOutcome, HarvestError>)]) -> ExitCode {
    let mut failed = 0;

    for (name, result) in results {
        match result {
            Ok(outcome) => println!(
                "{} [{}, {} records]: {}",
                outcome.source,
                outcome.status,
                outcome.records.len(),
                outcome.report_path.display()
            ),
            Err(e) => {
                failed += 1;
                eprintln!("{}: failed: {}", name, e);
            }
        }
    }

    if failed > 0 {
        tracing::error!("{} of {} run(s) failed", failed, results.len());
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
