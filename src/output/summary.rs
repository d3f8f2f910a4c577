//! End-of-crawl summary
//!
//! The summary is the crawl's externally observable report: why it stopped,
//! how many pages it produced, how fast, and what went wrong along the way.

use crate::state::StopReason;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Page totals used for the projection
const TEN_MILLION: f64 = 10_000_000.0;
const ONE_BILLION: f64 = 1_000_000_000.0;

/// Linear extrapolation of the observed crawl rate
///
/// This is plain arithmetic (`target / rate`), not a forecast: it assumes the
/// rate observed on this crawl would hold indefinitely.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Days needed to crawl 10,000,000 pages at the observed rate
    pub days_to_10m: f64,

    /// Days needed to crawl 1,000,000,000 pages at the observed rate
    pub days_to_1b: f64,
}

impl Projection {
    /// Builds a projection from a pages-per-minute rate
    ///
    /// Returns `None` when the rate is zero or not finite.
    pub fn from_rate(pages_per_minute: f64) -> Option<Self> {
        if !pages_per_minute.is_finite() || pages_per_minute <= 0.0 {
            return None;
        }
        let days = |pages: f64| pages / pages_per_minute / 60.0 / 24.0;
        Some(Self {
            days_to_10m: days(TEN_MILLION),
            days_to_1b: days(ONE_BILLION),
        })
    }
}

/// Summary statistics for a finished crawl
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    pub reason: StopReason,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration: Duration,
    pub total_pages: u64,
    pub pages_per_minute: f64,
    pub fetch_failures: u64,
    pub parse_failures: u64,
    pub sink_errors: u64,
    /// URLs still queued when the crawl stopped
    pub frontier_remaining: usize,
    /// Distinct URLs admitted over the whole crawl
    pub seen_urls: usize,
    pub projection: Option<Projection>,
}

impl CrawlSummary {
    /// Duration in minutes
    pub fn duration_minutes(&self) -> f64 {
        self.duration.as_secs_f64() / 60.0
    }

    /// Returns true if any record failed to reach the sink
    pub fn lost_records(&self) -> bool {
        self.sink_errors > 0
    }
}

/// Formats the summary as the plain-text crawl report
pub fn format_summary(summary: &CrawlSummary) -> String {
    let mut out = String::new();

    out.push_str(&format!("[END] Crawl finished. Reason: {}\n", summary.reason));
    out.push_str(&format!("Total pages: {}\n", summary.total_pages));
    out.push_str(&format!(
        "Duration: {:.1} minutes\n",
        summary.duration_minutes()
    ));
    out.push_str(&format!(
        "Avg rate: {:.1} pages/minute\n",
        summary.pages_per_minute
    ));
    out.push_str(&format!(
        "URLs seen: {} ({} still queued)\n",
        summary.seen_urls, summary.frontier_remaining
    ));

    if summary.fetch_failures > 0 || summary.parse_failures > 0 {
        out.push_str(&format!(
            "Skipped pages: {} fetch failures, {} parse failures\n",
            summary.fetch_failures, summary.parse_failures
        ));
    }

    if summary.lost_records() {
        out.push_str(&format!(
            "WARNING: {} records could not be written to the sink\n",
            summary.sink_errors
        ));
    }

    if let Some(projection) = &summary.projection {
        out.push_str("\n[Projection] linear extrapolation at the observed rate, not a forecast\n");
        out.push_str(&format!("~10M pages: {:.1} days\n", projection.days_to_10m));
        out.push_str(&format!("~1B pages: {:.0} days\n", projection.days_to_1b));
    }

    out
}

/// Prints the summary report to stdout
pub fn print_summary(summary: &CrawlSummary) {
    println!("\n{}", format_summary(summary));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> CrawlSummary {
        CrawlSummary {
            reason: StopReason::BudgetReached,
            started_at: Utc::now(),
            finished_at: Utc::now(),
            duration: Duration::from_secs(600),
            total_pages: 300,
            pages_per_minute: 30.0,
            fetch_failures: 0,
            parse_failures: 0,
            sink_errors: 0,
            frontier_remaining: 12,
            seen_urls: 312,
            projection: Projection::from_rate(30.0),
        }
    }

    #[test]
    fn test_projection_arithmetic() {
        let projection = Projection::from_rate(30.0).unwrap();
        // 10M / 30 per minute = 333,333.3 minutes = 231.48 days
        assert!((projection.days_to_10m - 231.481).abs() < 0.01);
        assert!((projection.days_to_1b - 23148.148).abs() < 0.01);
    }

    #[test]
    fn test_no_projection_without_rate() {
        assert!(Projection::from_rate(0.0).is_none());
        assert!(Projection::from_rate(f64::NAN).is_none());
    }

    #[test]
    fn test_format_summary() {
        let text = format_summary(&summary());
        assert!(text.contains("Reason: page budget reached"));
        assert!(text.contains("Total pages: 300"));
        assert!(text.contains("Duration: 10.0 minutes"));
        assert!(text.contains("Avg rate: 30.0 pages/minute"));
        assert!(text.contains("not a forecast"));
        assert!(text.contains("~10M pages: 231.5 days"));
        assert!(!text.contains("WARNING"));
    }

    #[test]
    fn test_format_summary_reports_sink_errors() {
        let mut s = summary();
        s.sink_errors = 2;
        s.projection = None;
        let text = format_summary(&s);
        assert!(text.contains("WARNING: 2 records"));
        assert!(!text.contains("[Projection]"));
    }
}
