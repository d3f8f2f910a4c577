//! Page pipeline: turns a parsed document into a record plus candidate links
//!
//! The pipeline is pure. It performs no I/O and does not touch crawl state,
//! so the controller decides what happens to the record and the links.

use crate::config::ExtractionConfig;
use crate::crawler::document::Document;
use crate::output::PageRecord;
use crate::text::{clean_text, extract_keywords, KeywordOptions};
use chrono::Utc;
use url::Url;

/// Elements whose text makes up the page content, in collection order
pub const TEXT_ELEMENTS: &[&str] = &["p", "h1", "h2", "h3", "h4", "h5", "h6", "div", "span", "li"];

/// Default cap on stored text, in characters
pub const DEFAULT_MAX_TEXT_LENGTH: usize = 2000;

/// What one page yields
#[derive(Debug, Clone)]
pub struct PageOutput {
    pub record: PageRecord,

    /// Absolute link targets in document order, not yet filtered
    pub links: Vec<Url>,
}

/// Record extraction settings
#[derive(Debug, Clone)]
pub struct PagePipeline {
    keywords: KeywordOptions,
    max_text_length: usize,
}

impl Default for PagePipeline {
    fn default() -> Self {
        Self {
            keywords: KeywordOptions::default(),
            max_text_length: DEFAULT_MAX_TEXT_LENGTH,
        }
    }
}

impl PagePipeline {
    pub fn new(keywords: KeywordOptions, max_text_length: usize) -> Self {
        Self {
            keywords,
            max_text_length,
        }
    }

    /// Builds a pipeline from the `[extraction]` config table
    pub fn from_config(config: &ExtractionConfig) -> Self {
        let mut keywords = KeywordOptions::new(config.min_keyword_length, config.max_keywords);
        if let Some(stop_words) = &config.stop_words {
            keywords = keywords.with_stop_words(stop_words.iter().cloned());
        }
        Self::new(keywords, config.max_text_length)
    }

    /// Extracts the record and candidate links of one page
    ///
    /// # Arguments
    ///
    /// * `doc` - The parsed page
    /// * `status` - HTTP status of the response
    /// * `body_len` - Size of the raw body in bytes
    /// * `crawl_order` - 1-based position of this page in the crawl
    pub fn process(&self, doc: &Document, status: u16, body_len: usize, crawl_order: u64) -> PageOutput {
        let raw_text = TEXT_ELEMENTS
            .iter()
            .flat_map(|kind| doc.texts_of(kind))
            .collect::<Vec<_>>()
            .join(" ");

        let cleaned = clean_text(&raw_text);
        let keywords = extract_keywords(&cleaned, &self.keywords);
        let word_count = cleaned.split_whitespace().count();

        let hrefs = doc.hrefs();
        let link_count = hrefs.len();
        let links = hrefs.iter().filter_map(|href| doc.resolve(href)).collect();

        let record = PageRecord {
            url: doc.url().to_string(),
            title: doc.title(),
            text_content: truncate_chars(&cleaned, self.max_text_length),
            keyword_count: keywords.len(),
            keywords,
            word_count,
            link_count,
            crawl_timestamp: Utc::now(),
            crawl_order,
            status_code: status,
            page_size: body_len,
        };

        PageOutput { record, links }
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
