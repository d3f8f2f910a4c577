use serde::Deserialize;

/// Main configuration structure for a crawl
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// URL the crawl starts from
    #[serde(rename = "seed-url")]
    pub seed_url: String,

    /// Hosts containing any of these strings are in scope
    #[serde(rename = "allowed-domains")]
    pub allowed_domains: Vec<String>,

    /// Maximum number of pages to crawl
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: u64,

    /// Delay between dispatched requests (milliseconds)
    #[serde(rename = "download-delay-ms", default = "default_download_delay_ms")]
    pub download_delay_ms: u64,

    /// Draw each delay uniformly from 0.5x to 1.5x of `download_delay_ms`
    #[serde(rename = "randomize-delay", default = "default_true")]
    pub randomize_delay: bool,

    /// Maximum number of fetches in flight
    #[serde(rename = "concurrent-requests", default = "default_concurrent_requests")]
    pub concurrent_requests: u32,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Honor robots.txt exclusions
    #[serde(rename = "obey-robots", default = "default_true")]
    pub obey_robots: bool,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the User-Agent header value
    ///
    /// Format: `CrawlerName/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Page extraction configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfig {
    #[serde(rename = "min-keyword-length", default = "default_min_keyword_length")]
    pub min_keyword_length: usize,

    #[serde(rename = "max-keywords", default = "default_max_keywords")]
    pub max_keywords: usize,

    /// Characters of cleaned text kept in each record
    #[serde(rename = "max-text-length", default = "default_max_text_length")]
    pub max_text_length: usize,

    /// Overrides the default non-HTML extension list
    #[serde(rename = "blocked-extensions", default)]
    pub blocked_extensions: Option<Vec<String>>,

    /// Overrides the default stop-word list
    #[serde(rename = "stop-words", default)]
    pub stop_words: Option<Vec<String>>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_keyword_length: default_min_keyword_length(),
            max_keywords: default_max_keywords(),
            max_text_length: default_max_text_length(),
            blocked_extensions: None,
            stop_words: None,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path the page records are written to
    #[serde(rename = "records-path", default = "default_records_path")]
    pub records_path: String,

    /// Record file format
    #[serde(default)]
    pub format: OutputFormat,

    /// Optional path for a markdown crawl summary
    #[serde(rename = "summary-path", default)]
    pub summary_path: Option<String>,
}

/// Supported record formats
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One JSON object per line
    #[default]
    Jsonl,
    /// SQLite database with a `pages` table
    Sqlite,
}

fn default_max_pages() -> u64 {
    1500
}

fn default_download_delay_ms() -> u64 {
    2000
}

fn default_true() -> bool {
    true
}

fn default_concurrent_requests() -> u32 {
    1
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_min_keyword_length() -> usize {
    4
}

fn default_max_keywords() -> usize {
    15
}

fn default_max_text_length() -> usize {
    2000
}

fn default_records_path() -> String {
    "crawl_data.json".to_string()
}
