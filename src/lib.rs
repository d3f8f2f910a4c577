//! sitecrawl: a focused single-domain web crawler
//!
//! Starting from a seed URL, the crawler walks every reachable page whose host
//! falls inside the allowed domains, extracts a [`PageRecord`] (title, cleaned
//! text, ranked keywords) from each one, and stops once the page budget is
//! spent, the frontier runs dry, or the process is asked to stop.

pub mod config;
pub mod crawler;
pub mod output;
pub mod robots;
pub mod state;
pub mod text;
pub mod url;

use thiserror::Error;

/// Main error type for crawl operations
///
/// Only setup failures surface through this type. Per-page failures are
/// handled inside the controller and reported in the crawl summary.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Sink error: {0}")]
    Sink(#[from] output::SinkError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid crawl state: {0}")]
    InvalidState(String),
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

    #[error("Invalid domain pattern: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Controller, Frontier, PagePipeline};
pub use output::{CrawlSummary, PageRecord};
pub use state::{CrawlPhase, StopReason};
pub use url::{normalize_url, should_follow, FollowPolicy};
