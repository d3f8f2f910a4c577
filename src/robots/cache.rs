//! Per-origin robots.txt cache
//!
//! Each origin's robots.txt is fetched once per crawl and reused for every
//! later URL on that origin.

use crate::robots::{fetch_robots, ParsedRobots};
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Mutex;
use url::Url;

/// Cache of parsed robots.txt files keyed by origin
#[derive(Debug)]
pub struct RobotsCache {
    user_agent: String,
    entries: Mutex<HashMap<String, ParsedRobots>>,
}

impl RobotsCache {
    /// Creates an empty cache checking rules for `user_agent`
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Stores rules for an origin, replacing any earlier entry
    pub fn insert(&self, origin: &str, robots: ParsedRobots) {
        self.lock().insert(origin.to_string(), robots);
    }

    /// Returns cached rules for an origin
    pub fn get(&self, origin: &str) -> Option<ParsedRobots> {
        self.lock().get(origin).cloned()
    }

    /// Number of cached origins
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks whether `url` may be fetched, fetching robots.txt on first use
    /// of its origin
    pub async fn is_allowed(&self, client: &Client, url: &Url) -> bool {
        let origin = url.origin().ascii_serialization();

        let robots = match self.get(&origin) {
            Some(robots) => robots,
            None => {
                let robots = fetch_robots(client, url).await;
                self.insert(&origin, robots.clone());
                robots
            }
        };

        robots.is_allowed(url.as_str(), &self.user_agent)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, ParsedRobots>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
