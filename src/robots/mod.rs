//! Robots.txt handling module
//!
//! Fetching, parsing, and caching robots.txt for the HTTP fetcher. A missing
//! or unreachable robots.txt allows everything.

mod cache;
mod parser;

pub use cache::RobotsCache;
pub use parser::ParsedRobots;

use reqwest::Client;
use url::Url;

/// Fetches robots.txt for the origin of `url`
///
/// Any 2xx response is parsed. Anything else (404, 5xx, network error or an
/// unreadable body) yields [`ParsedRobots::allow_all`].
pub async fn fetch_robots(client: &Client, url: &Url) -> ParsedRobots {
    let robots_url = match url.join("/robots.txt") {
        Ok(robots_url) => robots_url,
        Err(_) => return ParsedRobots::allow_all(),
    };

    tracing::debug!("Fetching robots.txt: {}", robots_url);

    match client.get(robots_url.clone()).send().await {
        Ok(response) if response.status().is_success() => match response.text().await {
            Ok(body) => ParsedRobots::from_content(&body),
            Err(e) => {
                tracing::warn!("Unreadable robots.txt at {}: {}", robots_url, e);
                ParsedRobots::allow_all()
            }
        },
        Ok(response) => {
            tracing::debug!(
                "No robots.txt at {} (HTTP {})",
                robots_url,
                response.status().as_u16()
            );
            ParsedRobots::allow_all()
        }
        Err(e) => {
            tracing::warn!("Failed to fetch robots.txt at {}: {}", robots_url, e);
            ParsedRobots::allow_all()
        }
    }
}
