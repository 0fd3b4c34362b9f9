//! Promo-Sweep main entry point
//!
//! This is the command-line interface for the Promo-Sweep promo-code
//! discovery tool.

use anyhow::Context;
use clap::Parser;
use promo_sweep::config::{load_config_with_hash, Config};
use promo_sweep::crawler::{discover, seed_frontier};
use promo_sweep::report::{build_report, fetch_race_title, format_report, write_markdown_summary};
use promo_sweep::session::build_session;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Promo-Sweep: promo-code discovery and usage reporting
///
/// Promo-Sweep crawls a race-registration site's promo-code listings for
/// one race, visits every discovered detail page, and reports the codes
/// grouped by discount with their remaining usage counts.
#[derive(Parser, Debug)]
#[command(name = "promo-sweep")]
#[command(version = "1.0.0")]
#[command(about = "Promo-code discovery and usage reporting", long_about = None)]
struct Cli {
    /// Race identifier to sweep (defaults to the configured race)
    #[arg(value_name = "RACE_ID")]
    race_id: Option<String>,

    /// Path to TOML configuration file (defaults apply without one)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Override the cookie file path from the config
    #[arg(long, value_name = "FILE")]
    cookies: Option<String>,

    /// Override the markdown summary path from the config
    #[arg(long, value_name = "FILE")]
    summary_path: Option<String>,

    /// Skip writing the markdown summary
    #[arg(long, conflicts_with = "summary_path")]
    no_summary: bool,

    /// Validate config and show what would be fetched without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No config file given, using built-in defaults");
            Config::default()
        }
    };

    if let Some(cookies) = cli.cookies.clone() {
        config.session.cookies_path = cookies;
    }
    if let Some(summary_path) = cli.summary_path.clone() {
        config.output.summary_path = summary_path;
    }

    let race_id = cli
        .race_id
        .clone()
        .unwrap_or_else(|| config.site.default_race_id.clone());

    if cli.dry_run {
        handle_dry_run(&config, &race_id);
        return Ok(());
    }

    handle_sweep(&config, &race_id, cli.no_summary).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("promo_sweep=info,warn"),
            1 => EnvFilter::new("promo_sweep=debug,info"),
            2 => EnvFilter::new("promo_sweep=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows the seed frontier
fn handle_dry_run(config: &Config, race_id: &str) {
    println!("=== Promo-Sweep Dry Run ===\n");

    println!("Site:");
    println!("  Base URL: {}", config.site.base_url);
    println!("  Race: {}", race_id);
    println!("  Detail path: {}", config.site.detail_path);
    println!("  Max pages per listing: {}", config.site.max_pages);

    println!("\nListing templates ({}):", config.site.listing_templates.len());
    for template in &config.site.listing_templates {
        println!("  - {}", template);
    }

    println!("\nSession:");
    println!("  Cookie file: {}", config.session.cookies_path);
    println!("  Request timeout: {}s", config.session.timeout_secs);

    println!("\nOutput:");
    println!("  Summary: {}", config.output.summary_path);

    let seeds = seed_frontier(&config.site, race_id);
    println!("\n✓ Configuration is valid");
    println!("✓ Would seed {} candidate requests", seeds.len());
}

/// Runs the full sweep: discovery, detail phase, report
async fn handle_sweep(config: &Config, race_id: &str, no_summary: bool) -> anyhow::Result<()> {
    let client = build_session(&config.session)
        .with_context(|| format!("failed to build session from {}", config.session.cookies_path))?;

    tracing::info!("Sweeping promo codes for race {}", race_id);
    let mut progress = |issued: usize, pending: usize, last_url: &str| {
        if last_url.is_empty() {
            tracing::info!("Discovery done: {} requests issued, {} left queued", issued, pending);
        } else {
            tracing::info!("Discovery: {} issued, {} queued, at {}", issued, pending, last_url);
        }
    };

    let promos = match discover(&client, &config.site, race_id, Some(&mut progress)).await {
        Ok(promos) => promos,
        Err(e) => {
            tracing::error!("Sweep failed: {}", e);
            return Err(e.into());
        }
    };
    tracing::info!("Detail phase finished: {} promo records", promos.len());

    let race_title = fetch_race_title(&client, &config.site.base_url, race_id).await;
    let report = build_report(promos, &config.site.detail_path);

    print!("{}", format_report(&report, race_id, race_title.as_deref()));

    if !no_summary {
        let path = Path::new(&config.output.summary_path);
        write_markdown_summary(&report, race_id, race_title.as_deref(), path)
            .with_context(|| format!("failed to write summary to {}", config.output.summary_path))?;
        println!("\n✓ Summary written to: {}", config.output.summary_path);
    }

    Ok(())
}
