use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};

/// Pages between two progress lines
pub const PROGRESS_INTERVAL: u64 = 50;

/// Counters owned by the crawl controller
///
/// The page budget is enforced through slots: a slot is reserved before a
/// fetch is dispatched, committed when the page is processed, and released
/// when the fetch or parse fails. `pages_crawled + in_flight` never exceeds
/// `max_pages`, so the budget holds exactly at any concurrency.
#[derive(Debug, Clone)]
pub struct CrawlState {
    pub max_pages: u64,
    pub pages_crawled: u64,
    pub in_flight: u64,
    pub started_at: Instant,
    pub started_wall: DateTime<Utc>,
    pub fetch_failures: u64,
    pub parse_failures: u64,
    pub sink_errors: u64,
}

impl CrawlState {
    /// Creates fresh counters with the clock starting now
    pub fn new(max_pages: u64) -> Self {
        Self {
            max_pages,
            pages_crawled: 0,
            in_flight: 0,
            started_at: Instant::now(),
            started_wall: Utc::now(),
            fetch_failures: 0,
            parse_failures: 0,
            sink_errors: 0,
        }
    }

    /// Restarts the clock; called when the crawl enters `Running`
    pub fn start(&mut self) {
        self.started_at = Instant::now();
        self.started_wall = Utc::now();
        self.pages_crawled = 0;
        self.in_flight = 0;
    }

    /// Returns true once the committed page count has reached the budget
    pub fn budget_reached(&self) -> bool {
        self.pages_crawled >= self.max_pages
    }

    /// Reserves a budget slot for a fetch about to be dispatched
    ///
    /// Returns false when every remaining slot is taken.
    pub fn try_reserve(&mut self) -> bool {
        if self.pages_crawled + self.in_flight >= self.max_pages {
            return false;
        }
        self.in_flight += 1;
        true
    }

    /// Converts a reserved slot into a crawled page
    ///
    /// Returns the 1-based crawl order of the page.
    pub fn commit(&mut self) -> u64 {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.pages_crawled += 1;
        self.pages_crawled
    }

    /// Gives back a reserved slot after a failed fetch or parse
    pub fn release(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    /// Returns true if a progress line is due at the current page count
    pub fn progress_due(&self) -> bool {
        self.pages_crawled % PROGRESS_INTERVAL == 0
    }

    /// Time since the crawl started
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Observed crawl rate in pages per minute
    pub fn pages_per_minute(&self) -> f64 {
        rate_per_minute(self.pages_crawled, self.elapsed())
    }
}

/// Pages per minute for a count over a duration; zero for a zero duration
pub fn rate_per_minute(pages: u64, elapsed: Duration) -> f64 {
    let minutes = elapsed.as_secs_f64() / 60.0;
    if minutes > 0.0 {
        pages as f64 / minutes
    } else {
        0.0
    }
}
