//! Sink trait and error types
//!
//! A sink receives every [`PageRecord`] the crawl produces. The controller is
//! the only writer and calls `write` in crawl order, but implementations must
//! still be `Send + Sync` so they can live behind an `Arc`.

use crate::output::PageRecord;
use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while writing records
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Destination for page records
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Persists one record
    ///
    /// A failure loses this record only; the crawl keeps going.
    async fn write(&self, record: &PageRecord) -> SinkResult<()>;

    /// Flushes buffered records; called once when the crawl closes
    async fn flush(&self) -> SinkResult<()>;
}

#[async_trait]
impl<S: RecordSink + ?Sized> RecordSink for Box<S> {
    async fn write(&self, record: &PageRecord) -> SinkResult<()> {
        (**self).write(record).await
    }

    async fn flush(&self) -> SinkResult<()> {
        (**self).flush().await
    }
}
