//! HTTP fetching
//!
//! The controller talks to a [`Fetcher`] so tests can swap the network for a
//! scripted page table. [`HttpFetcher`] is the reqwest implementation:
//! - redirects followed up to 10 hops
//! - per-request timeout
//! - non-2xx and non-HTML responses rejected
//! - optional robots.txt exclusion, cached per origin and applied to both
//!   the requested URL and the redirect target

use crate::config::{Config, UserAgentConfig};
use crate::robots::RobotsCache;
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, redirect::Policy, Client};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Maximum redirect hops followed for one request
pub const MAX_REDIRECTS: usize = 10;

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL after redirects
    pub final_url: Url,

    pub status: u16,

    /// Raw response body
    pub body: Vec<u8>,

    /// `charset` parameter of the Content-Type header, if any
    pub charset: Option<String>,
}

/// Why a fetch produced no page
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("Expected HTML, got {0}")]
    ContentMismatch(String),

    #[error("Disallowed by robots.txt")]
    RobotsDenied,

    #[error("Failed to read body: {0}")]
    Body(String),
}

/// Retrieves pages
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches one URL, giving up after `timeout`
    async fn fetch(&self, url: &Url, timeout: Duration) -> Result<FetchedPage, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use sitecrawl::config::UserAgentConfig;
/// use sitecrawl::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "sitecrawl".to_string(),
///     crawler_version: "0.1".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Returns true for HTML content types, or when the server sent none
pub fn is_html_content_type(content_type: Option<&str>) -> bool {
    match content_type {
        None => true,
        Some(value) => {
            let value = value.to_ascii_lowercase();
            value.contains("text/html") || value.contains("application/xhtml+xml")
        }
    }
}

/// Extracts the `charset` parameter from a Content-Type value
pub fn charset_of(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        if !name.trim().eq_ignore_ascii_case("charset") {
            return None;
        }
        let value = value.trim().trim_matches('"');
        (!value.is_empty()).then(|| value.to_string())
    })
}

/// reqwest-backed fetcher
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    robots: Option<std::sync::Arc<RobotsCache>>,
}

impl HttpFetcher {
    /// Builds a fetcher from the crawl config
    ///
    /// robots.txt is consulted only when `[crawler] obey-robots` is set.
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = build_http_client(&config.user_agent)?;
        let fetcher = Self::with_client(client);

        Ok(if config.crawler.obey_robots {
            fetcher.with_robots(RobotsCache::new(config.user_agent.crawler_name.clone()))
        } else {
            fetcher
        })
    }

    /// Wraps an existing client, without robots.txt checks
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            robots: None,
        }
    }

    /// Enables robots.txt checks through the given cache
    pub fn with_robots(mut self, cache: RobotsCache) -> Self {
        self.robots = Some(std::sync::Arc::new(cache));
        self
    }

    pub fn obeys_robots(&self) -> bool {
        self.robots.is_some()
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url, timeout: Duration) -> Result<FetchedPage, FetchError> {
        if let Some(robots) = &self.robots {
            if !robots.is_allowed(&self.client, url).await {
                return Err(FetchError::RobotsDenied);
            }
        }

        let response = self
            .client
            .get(url.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(classify_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        if !is_html_content_type(content_type.as_deref()) {
            return Err(FetchError::ContentMismatch(content_type.unwrap_or_default()));
        }

        let final_url = response.url().clone();
        if &final_url != url {
            if let Some(robots) = &self.robots {
                if !robots.is_allowed(&self.client, &final_url).await {
                    return Err(FetchError::RobotsDenied);
                }
            }
        }

        let charset = content_type.as_deref().and_then(charset_of);
        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Body(e.to_string())
            }
        })?;

        Ok(FetchedPage {
            final_url,
            status: status.as_u16(),
            body: body.to_vec(),
            charset,
        })
    }
}

fn classify_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else if e.is_redirect() {
        FetchError::Network(format!("Redirect error: {}", e))
    } else if e.is_connect() {
        FetchError::Network(format!("Connection failed: {}", e))
    } else {
        FetchError::Network(e.to_string())
    }
}
