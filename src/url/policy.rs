//! Follow policy: decides whether a discovered link may enter the frontier
//!
//! Every check is a pure function of the candidate URL and the policy
//! configuration, so a single policy can be shared freely between tasks.

use super::domain::host_matches;
use url::Url;

/// File extensions that never lead to an HTML page
pub const DEFAULT_BLOCKED_EXTENSIONS: &[&str] = &[
    ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx", ".zip", ".tar", ".gz", ".jpg",
    ".jpeg", ".png", ".gif", ".mp4", ".avi", ".mov", ".mp3", ".wav", ".css", ".js",
];

/// Link schemes that can never be fetched
const PSEUDO_SCHEMES: &[&str] = &["mailto:", "javascript:", "tel:"];

/// Outcome of running a candidate link through the follow policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowDecision {
    /// The link is eligible for the frontier
    Follow,
    /// mailto:, javascript: or tel: link
    PseudoScheme,
    /// Not a well-formed absolute URL
    Malformed,
    /// Parsed, but the scheme is not http or https
    UnsupportedScheme,
    /// Host is outside every allowed domain
    OffDomain,
    /// Path ends with a non-HTML file extension
    BlockedExtension,
}

impl FollowDecision {
    /// Returns true if the link should be followed
    pub fn is_follow(&self) -> bool {
        matches!(self, Self::Follow)
    }
}

/// Admission rules for discovered links
#[derive(Debug, Clone)]
pub struct FollowPolicy {
    allowed_domains: Vec<String>,
    blocked_extensions: Vec<String>,
}

impl FollowPolicy {
    /// Creates a policy for the given allowed domains with the default
    /// blocked-extension list
    pub fn new<I, S>(allowed_domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed_domains: allowed_domains.into_iter().map(Into::into).collect(),
            blocked_extensions: DEFAULT_BLOCKED_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
        }
    }

    /// Replaces the blocked-extension list
    pub fn with_blocked_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.blocked_extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().to_lowercase())
            .collect();
        self
    }

    /// Returns the allowed domains
    pub fn allowed_domains(&self) -> &[String] {
        &self.allowed_domains
    }

    /// Classifies a candidate link
    ///
    /// The candidate must already be absolute; resolving relative hrefs
    /// against the page is the caller's job, so a relative href is
    /// [`FollowDecision::Malformed`] here.
    pub fn decide(&self, candidate: &str) -> FollowDecision {
        let candidate = candidate.trim();
        let lowered = candidate.to_lowercase();

        if PSEUDO_SCHEMES.iter().any(|s| lowered.starts_with(s)) {
            return FollowDecision::PseudoScheme;
        }

        let url = match Url::parse(candidate) {
            Ok(url) => url,
            Err(_) => return FollowDecision::Malformed,
        };

        if url.scheme() != "http" && url.scheme() != "https" {
            return FollowDecision::UnsupportedScheme;
        }

        let host = match url.host_str() {
            Some(host) if !host.is_empty() => host,
            _ => return FollowDecision::Malformed,
        };

        if !host_matches(host, &self.allowed_domains) {
            return FollowDecision::OffDomain;
        }

        let path = url.path().to_lowercase();
        if self
            .blocked_extensions
            .iter()
            .any(|ext| path.ends_with(ext.as_str()))
        {
            return FollowDecision::BlockedExtension;
        }

        FollowDecision::Follow
    }

    /// Returns true if the candidate link discovered on `source` should be
    /// queued
    pub fn should_follow(&self, candidate: &str, source: &Url) -> bool {
        let decision = self.decide(candidate);
        if !decision.is_follow() {
            tracing::trace!(
                "Skipping {} (found on {}): {:?}",
                candidate,
                source,
                decision
            );
        }
        decision.is_follow()
    }
}

/// Convenience wrapper using the default blocked-extension list
///
/// # Examples
///
/// ```
/// use sitecrawl::url::should_follow;
/// use url::Url;
///
/// let source = Url::parse("https://cc.gatech.edu/").unwrap();
/// let allowed = ["cc.gatech.edu"];
///
/// assert!(should_follow("https://cc.gatech.edu/about", &source, &allowed));
/// assert!(!should_follow("mailto:x@y.com", &source, &allowed));
/// assert!(!should_follow("https://other.org/page", &source, &allowed));
/// assert!(!should_follow("https://cc.gatech.edu/doc.pdf", &source, &allowed));
/// ```
pub fn should_follow<S: AsRef<str>>(candidate: &str, source: &Url, allowed_domains: &[S]) -> bool {
    FollowPolicy::new(allowed_domains.iter().map(|d| d.as_ref().to_string()))
        .should_follow(candidate, source)
}
