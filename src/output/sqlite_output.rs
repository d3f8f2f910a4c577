//! SQLite record sink
//!
//! Stores one row per page in a `pages` table keyed by crawl order.
//! Keywords are kept as a JSON array in a text column.

use crate::output::traits::{RecordSink, SinkResult};
use crate::output::PageRecord;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;

/// SQL schema for the record database
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS pages (
    crawl_order INTEGER PRIMARY KEY,
    url TEXT NOT NULL,
    title TEXT NOT NULL,
    text_content TEXT NOT NULL,
    keywords TEXT NOT NULL,
    keyword_count INTEGER NOT NULL,
    word_count INTEGER NOT NULL,
    link_count INTEGER NOT NULL,
    crawl_timestamp TEXT NOT NULL,
    status_code INTEGER NOT NULL,
    page_size INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_pages_url ON pages(url);
"#;

/// Sink writing records into a SQLite database
pub struct SqliteSink {
    conn: Mutex<Connection>,
}

impl SqliteSink {
    /// Opens the database at `path` for a new crawl, clearing records from
    /// earlier crawls
    pub fn create(path: &Path) -> SinkResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let sink = Self::open(path)?;
        sink.conn
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .execute("DELETE FROM pages", [])?;
        Ok(sink)
    }

    /// Opens the database at `path`, keeping existing records
    pub fn open(path: &Path) -> SinkResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
        ",
        )?;
        Self::from_connection(conn)
    }

    /// Creates an in-memory database
    pub fn open_in_memory() -> SinkResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> SinkResult<Self> {
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Number of stored records
    pub fn count(&self) -> SinkResult<u64> {
        let conn = self.conn.lock().unwrap_or_else(|p| p.into_inner());
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM pages", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Loads every stored record in crawl order
    pub fn load_records(&self) -> SinkResult<Vec<PageRecord>> {
        let conn = self.conn.lock().unwrap_or_else(|p| p.into_inner());
        let mut stmt = conn.prepare(
            "SELECT url, title, text_content, keywords, keyword_count, word_count, link_count,
                    crawl_timestamp, status_code, page_size, crawl_order
             FROM pages ORDER BY crawl_order",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, i64>(4)?,
                row.get::<_, i64>(5)?,
                row.get::<_, i64>(6)?,
                row.get::<_, String>(7)?,
                row.get::<_, i64>(8)?,
                row.get::<_, i64>(9)?,
                row.get::<_, i64>(10)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (url, title, text, keywords, kc, wc, lc, ts, status, size, order) = row?;
            let crawl_timestamp = chrono::DateTime::parse_from_rfc3339(&ts)
                .map(|t| t.with_timezone(&chrono::Utc))
                .map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        7,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?;
            records.push(PageRecord {
                url,
                title,
                text_content: text,
                keywords: serde_json::from_str(&keywords)?,
                keyword_count: kc as usize,
                word_count: wc as usize,
                link_count: lc as usize,
                crawl_timestamp,
                crawl_order: order as u64,
                status_code: status as u16,
                page_size: size as usize,
            });
        }

        Ok(records)
    }
}

#[async_trait]
impl RecordSink for SqliteSink {
    async fn write(&self, record: &PageRecord) -> SinkResult<()> {
        let keywords = serde_json::to_string(&record.keywords)?;
        let conn = self.conn.lock().unwrap_or_else(|p| p.into_inner());
        conn.execute(
            "INSERT OR REPLACE INTO pages (
                crawl_order, url, title, text_content, keywords, keyword_count,
                word_count, link_count, crawl_timestamp, status_code, page_size
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                record.crawl_order as i64,
                record.url,
                record.title,
                record.text_content,
                keywords,
                record.keyword_count as i64,
                record.word_count as i64,
                record.link_count as i64,
                record.crawl_timestamp.to_rfc3339(),
                record.status_code as i64,
                record.page_size as i64,
            ],
        )?;
        Ok(())
    }

    async fn flush(&self) -> SinkResult<()> {
        // Every write is committed immediately
        Ok(())
    }
}
