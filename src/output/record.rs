//! The structured record produced for each crawled page

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Extraction result for one fetched page
///
/// Created once per successfully processed page and handed to a sink; never
/// modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    /// Final URL of the page after redirects
    pub url: String,

    /// Trimmed `<title>` text, empty when the page has none
    pub title: String,

    /// Cleaned page text, truncated to the configured length
    pub text_content: String,

    /// Keywords ranked by frequency, ties in first-occurrence order
    pub keywords: Vec<String>,

    pub keyword_count: usize,

    /// Whitespace-delimited tokens in the full cleaned text
    pub word_count: usize,

    /// Number of `<a href>` attributes on the page
    pub link_count: usize,

    pub crawl_timestamp: DateTime<Utc>,

    /// 1-based position of this page in the crawl
    pub crawl_order: u64,

    pub status_code: u16,

    /// Raw body size in bytes
    pub page_size: usize,
}
