//! sitecrawl main entry point
//!
//! This is the command-line interface for the sitecrawl single-domain crawler.

use anyhow::Context;
use clap::Parser;
use sitecrawl::config::{load_config_with_hash, validate, Config};
use sitecrawl::crawler::{crawl, CrawlSettings, StopHandle};
use sitecrawl::output::print_summary;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// sitecrawl: a focused single-domain web crawler
///
/// sitecrawl walks every page reachable from a seed URL inside the allowed
/// domains, writes one record per page (title, cleaned text, keywords), and
/// prints a crawl summary when it stops.
#[derive(Parser, Debug)]
#[command(name = "sitecrawl")]
#[command(version)]
#[command(about = "A focused single-domain web crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Override the page budget from the config file
    #[arg(long, value_name = "N")]
    max_pages: Option<u64>,

    /// Override the seed URL from the config file
    #[arg(long, value_name = "URL")]
    seed: Option<String>,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    apply_overrides(&mut config, &cli)?;

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitecrawl=info,warn"),
            1 => EnvFilter::new("sitecrawl=debug,info"),
            2 => EnvFilter::new("sitecrawl=trace,debug"),
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

/// Applies command-line overrides and re-validates the result
fn apply_overrides(config: &mut Config, cli: &Cli) -> anyhow::Result<()> {
    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = max_pages;
    }
    if let Some(seed) = &cli.seed {
        config.crawler.seed_url = seed.clone();
    }
    if cli.max_pages.is_some() || cli.seed.is_some() {
        validate(config).context("invalid command-line override")?;
    }
    Ok(())
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) {
    let settings = CrawlSettings::from_config(config);

    println!("=== sitecrawl Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Seed URL: {}", config.crawler.seed_url);
    println!("  Allowed domains: {}", config.crawler.allowed_domains.join(", "));
    println!("  Max pages: {}", settings.max_pages);
    println!(
        "  Download delay: {}ms{}",
        config.crawler.download_delay_ms,
        if settings.randomize_delay {
            " (randomized 0.5x-1.5x)"
        } else {
            ""
        }
    );
    println!("  Concurrent requests: {}", settings.concurrency);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    println!("  Obey robots.txt: {}", config.crawler.obey_robots);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nExtraction:");
    println!("  Min keyword length: {}", config.extraction.min_keyword_length);
    println!("  Max keywords: {}", config.extraction.max_keywords);
    println!("  Max text length: {}", config.extraction.max_text_length);

    println!("\nOutput:");
    println!(
        "  Records: {} ({:?})",
        config.output.records_path, config.output.format
    );
    match &config.output.summary_path {
        Some(path) => println!("  Summary: {}", path),
        None => println!("  Summary: stdout only"),
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would crawl up to {} pages starting from {}",
        settings.max_pages, config.crawler.seed_url
    );
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    let stop = StopHandle::new();

    let stop_signal = stop.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received Ctrl-C, finishing in-flight pages");
            stop_signal.stop();
        }
    });

    tracing::info!(
        "Crawling {} (allowed: {})",
        config.crawler.seed_url,
        config.crawler.allowed_domains.join(", ")
    );

    let summary = crawl(&config, stop).await.context("crawl failed")?;
    print_summary(&summary);

    if summary.lost_records() {
        tracing::warn!(
            "{} record(s) could not be written to {}",
            summary.sink_errors,
            config.output.records_path
        );
    }

    Ok(())
}
