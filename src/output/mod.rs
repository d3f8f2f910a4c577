//! Output module for page records and crawl reports
//!
//! This module handles:
//! - The [`PageRecord`] produced for every crawled page
//! - Sinks that persist records (JSON lines, SQLite, memory)
//! - The end-of-crawl summary and its markdown export

mod jsonl;
mod markdown;
mod memory;
mod record;
mod sqlite_output;
pub mod summary;
mod traits;

pub use jsonl::JsonLinesSink;
pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use memory::MemorySink;
pub use record::PageRecord;
pub use sqlite_output::SqliteSink;
pub use summary::{format_summary, print_summary, CrawlSummary, Projection};
pub use traits::{RecordSink, SinkError, SinkResult};

use crate::config::{OutputConfig, OutputFormat};
use std::path::Path;

/// Opens the sink described by the output configuration
///
/// # Returns
///
/// * `Ok(Box<dyn RecordSink>)` - Sink ready for writing; earlier records at
///   the same path are discarded
/// * `Err(SinkError)` - The record file or database could not be opened
pub async fn open_sink(config: &OutputConfig) -> SinkResult<Box<dyn RecordSink>> {
    let path = Path::new(&config.records_path);
    let sink: Box<dyn RecordSink> = match config.format {
        OutputFormat::Jsonl => Box::new(JsonLinesSink::create(path).await?),
        OutputFormat::Sqlite => Box::new(SqliteSink::create(path)?),
    };
    tracing::info!(
        "Writing records to {} ({:?})",
        config.records_path,
        config.format
    );
    Ok(sink)
}
