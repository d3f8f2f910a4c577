//! URL handling for the crawler
//!
//! This module provides URL normalization, host matching against the allowed
//! domains, and the follow policy that admits discovered links.

mod domain;
mod normalize;
pub mod policy;

pub use domain::{extract_domain, host_matches};
pub use normalize::normalize_url;
pub(crate) use normalize::normalize_parsed;
pub use policy::{should_follow, FollowDecision, FollowPolicy, DEFAULT_BLOCKED_EXTENSIONS};
