//! Crawler module for page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - The frontier of pending URLs
//! - HTTP fetching and robots.txt exclusion
//! - HTML parsing and record extraction
//! - Download delay between requests
//! - The crawl loop that ties them together

mod controller;
mod document;
mod fetcher;
mod frontier;
mod pipeline;
mod politeness;

pub use controller::{CrawlSettings, Controller, StopHandle};
pub use document::{Document, ParseError};
pub use fetcher::{build_http_client, is_html_content_type, FetchError, FetchedPage, Fetcher, HttpFetcher};
pub use frontier::{CrawlTask, Frontier};
pub use pipeline::{PageOutput, PagePipeline, TEXT_ELEMENTS};
pub use politeness::Politeness;

use crate::config::Config;
use crate::output::{generate_markdown_summary, open_sink, CrawlSummary};
use crate::url::normalize_url;
use crate::CrawlError;
use std::path::Path;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Seed the frontier with the configured seed URL
/// 2. Build the HTTP fetcher
/// 3. Open the record sink (truncating an existing records file)
/// 4. Run the crawl loop until a stop condition
/// 5. Write the markdown summary if one is configured
///
/// # Arguments
///
/// * `config` - A validated crawler configuration
/// * `stop` - Handle that ends the crawl early when triggered
///
/// # Returns
///
/// * `Ok(CrawlSummary)` - Crawl reached one of its stop conditions
/// * `Err(CrawlError)` - Setup failed (seed URL, HTTP client, sink)
pub async fn crawl(config: &Config, stop: StopHandle) -> Result<CrawlSummary, CrawlError> {
    let seed = normalize_url(&config.crawler.seed_url)?;
    let frontier = Frontier::with_seed(&seed);

    let fetcher = HttpFetcher::new(config)?;
    if fetcher.obeys_robots() {
        tracing::info!("Obeying robots.txt as {}", config.user_agent.crawler_name);
    }

    let sink = open_sink(&config.output).await?;

    let mut controller = Controller::new(CrawlSettings::from_config(config), frontier, fetcher, sink)
        .with_stop_handle(stop);
    let summary = controller.run().await?;

    if let Some(path) = &config.output.summary_path {
        generate_markdown_summary(&summary, Path::new(path))?;
        tracing::info!("Summary written to {}", path);
    }

    Ok(summary)
}
