//! robots.txt rules for one origin, checked with the robotstxt matcher

use robotstxt::DefaultMatcher;
use std::sync::Arc;

/// Rules from one robots.txt file
///
/// Cloning is cheap: the file body is shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedRobots {
    /// No usable robots.txt; every path may be fetched
    AllowAll,

    /// Body of a robots.txt file, matched on demand
    Rules(Arc<str>),
}

impl ParsedRobots {
    /// Wraps a fetched robots.txt body
    ///
    /// A blank body places no restrictions and becomes [`ParsedRobots::AllowAll`].
    pub fn from_content(content: &str) -> Self {
        if content.trim().is_empty() {
            Self::AllowAll
        } else {
            Self::Rules(Arc::from(content))
        }
    }

    pub fn allow_all() -> Self {
        Self::AllowAll
    }

    /// Returns true if `user_agent` may fetch `url`
    ///
    /// `url` may be absolute or a bare path such as `/people`.
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        match self {
            Self::AllowAll => true,
            Self::Rules(body) => {
                DefaultMatcher::default().one_agent_allowed_by_robots(body, user_agent, url)
            }
        }
    }
}
