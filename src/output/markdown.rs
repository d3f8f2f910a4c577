//! Markdown summary generation
//!
//! Writes the crawl summary as a small markdown report next to the records.

use crate::output::summary::CrawlSummary;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the markdown summary to `output_path`
pub fn generate_markdown_summary(summary: &CrawlSummary, output_path: &Path) -> std::io::Result<()> {
    let markdown = format_markdown_summary(summary);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a crawl summary as markdown
pub fn format_markdown_summary(summary: &CrawlSummary) -> String {
    let mut md = String::new();

    md.push_str("# Crawl Summary\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Started**: {}\n", summary.started_at.to_rfc3339()));
    md.push_str(&format!("- **Finished**: {}\n", summary.finished_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Duration**: {} seconds ({:.2} minutes)\n",
        summary.duration.as_secs(),
        summary.duration_minutes()
    ));
    md.push_str(&format!("- **Stop Reason**: {}\n\n", summary.reason));

    md.push_str("## Overall Statistics\n\n");
    md.push_str("| Metric | Value |\n|--------|-------|\n");
    md.push_str(&format!("| Pages crawled | {} |\n", summary.total_pages));
    md.push_str(&format!(
        "| Average rate | {:.1} pages/minute |\n",
        summary.pages_per_minute
    ));
    md.push_str(&format!("| URLs seen | {} |\n", summary.seen_urls));
    md.push_str(&format!(
        "| Still queued | {} |\n",
        summary.frontier_remaining
    ));
    md.push_str(&format!("| Fetch failures | {} |\n", summary.fetch_failures));
    md.push_str(&format!("| Parse failures | {} |\n", summary.parse_failures));
    md.push_str(&format!("| Lost records | {} |\n\n", summary.sink_errors));

    if let Some(projection) = &summary.projection {
        md.push_str("## Projection\n\n");
        md.push_str(
            "_Linear extrapolation of the observed rate. This is arithmetic, not a forecast._\n\n",
        );
        md.push_str(&format!(
            "- **10M pages**: {:.1} days\n",
            projection.days_to_10m
        ));
        md.push_str(&format!(
            "- **1B pages**: {:.0} days\n",
            projection.days_to_1b
        ));
    }

    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::summary::Projection;
    use crate::state::StopReason;
    use chrono::Utc;
    use std::time::Duration;

    fn summary() -> CrawlSummary {
        CrawlSummary {
            reason: StopReason::FrontierExhausted,
            started_at: Utc::now(),
            finished_at: Utc::now(),
            duration: Duration::from_secs(90),
            total_pages: 45,
            pages_per_minute: 30.0,
            fetch_failures: 3,
            parse_failures: 1,
            sink_errors: 0,
            frontier_remaining: 0,
            seen_urls: 49,
            projection: Projection::from_rate(30.0),
        }
    }

    #[test]
    fn test_markdown_sections() {
        let md = format_markdown_summary(&summary());
        assert!(md.starts_with("# Crawl Summary"));
        assert!(md.contains("- **Stop Reason**: frontier exhausted"));
        assert!(md.contains("| Pages crawled | 45 |"));
        assert!(md.contains("| Fetch failures | 3 |"));
        assert!(md.contains("## Projection"));
    }

    #[test]
    fn test_generate_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.md");
        generate_markdown_summary(&summary(), &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("| URLs seen | 49 |"));
    }
}
