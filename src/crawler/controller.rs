//! Crawl controller - the main crawl loop
//!
//! Workers only fetch. Every fetch result comes back to the controller
//! through a `JoinSet`, and the controller alone parses, commits budget
//! slots, writes records, and admits new links. Crawl state therefore has a
//! single writer at any concurrency.

use crate::config::Config;
use crate::crawler::document::{Document, ParseError};
use crate::crawler::fetcher::{FetchError, FetchedPage, Fetcher};
use crate::crawler::frontier::{CrawlTask, Frontier};
use crate::crawler::pipeline::{PageOutput, PagePipeline};
use crate::crawler::politeness::Politeness;
use crate::output::{CrawlSummary, Projection, RecordSink};
use crate::state::{CrawlPhase, CrawlState, StopReason};
use crate::url::{normalize_parsed, FollowPolicy};
use crate::CrawlError;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use url::Url;

type FetchOutcome = (CrawlTask, Result<FetchedPage, FetchError>);

/// Runtime settings for one crawl
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    /// Page budget; 0 crawls nothing
    pub max_pages: u64,

    /// Maximum fetches in flight at once
    pub concurrency: usize,

    pub request_timeout: Duration,
    pub download_delay: Duration,
    pub randomize_delay: bool,

    /// Decides which discovered links are queued
    pub policy: FollowPolicy,

    /// Turns fetched pages into records
    pub pipeline: PagePipeline,
}

impl CrawlSettings {
    /// Settings with the stock crawl limits for the given domains
    pub fn new<I, S>(allowed_domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            max_pages: 1500,
            concurrency: 1,
            request_timeout: Duration::from_secs(30),
            download_delay: Duration::from_secs(2),
            randomize_delay: true,
            policy: FollowPolicy::new(allowed_domains),
            pipeline: PagePipeline::default(),
        }
    }

    /// Derives settings from a validated config
    pub fn from_config(config: &Config) -> Self {
        let crawler = &config.crawler;

        let mut policy = FollowPolicy::new(crawler.allowed_domains.iter().cloned());
        if let Some(extensions) = &config.extraction.blocked_extensions {
            policy = policy.with_blocked_extensions(extensions.iter().cloned());
        }

        Self {
            max_pages: crawler.max_pages,
            concurrency: crawler.concurrent_requests.max(1) as usize,
            request_timeout: Duration::from_secs(crawler.request_timeout_secs),
            download_delay: Duration::from_millis(crawler.download_delay_ms),
            randomize_delay: crawler.randomize_delay,
            policy,
            pipeline: PagePipeline::from_config(&config.extraction),
        }
    }
}

/// Shared flag that asks a running crawl to stop
///
/// Once set, no new fetches are dispatched; fetches already in flight finish
/// and are processed before the crawl closes.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests the crawl to stop
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Main crawl controller
pub struct Controller<F, S> {
    settings: CrawlSettings,
    frontier: Arc<Frontier>,
    fetcher: Arc<F>,
    sink: S,
    state: CrawlState,
    phase: CrawlPhase,
    politeness: Politeness,
    stop: StopHandle,
}

impl<F, S> Controller<F, S>
where
    F: Fetcher + 'static,
    S: RecordSink,
{
    /// Creates a controller over a seeded frontier
    ///
    /// # Arguments
    ///
    /// * `settings` - Crawl limits, follow policy, and extraction settings
    /// * `frontier` - Frontier holding at least the seed URL
    /// * `fetcher` - Source of pages
    /// * `sink` - Destination of page records
    pub fn new(mut settings: CrawlSettings, frontier: Frontier, fetcher: F, sink: S) -> Self {
        settings.concurrency = settings.concurrency.max(1);
        let politeness = Politeness::new(settings.download_delay, settings.randomize_delay);
        let state = CrawlState::new(settings.max_pages);

        Self {
            settings,
            frontier: Arc::new(frontier),
            fetcher: Arc::new(fetcher),
            sink,
            state,
            phase: CrawlPhase::Idle,
            politeness,
            stop: StopHandle::new(),
        }
    }

    /// Uses an existing stop handle, e.g. one already wired to Ctrl-C
    pub fn with_stop_handle(mut self, stop: StopHandle) -> Self {
        self.stop = stop;
        self
    }

    /// Returns a handle that stops this crawl when triggered
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    pub fn state(&self) -> &CrawlState {
        &self.state
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Consumes the controller, returning its sink
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Runs the crawl to completion
    ///
    /// Per-page failures are logged and tallied; they never end the crawl.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlSummary)` - The crawl stopped for one of the three stop reasons
    /// * `Err(CrawlError::InvalidState)` - The controller was already run
    pub async fn run(&mut self) -> Result<CrawlSummary, CrawlError> {
        if self.phase != CrawlPhase::Idle {
            return Err(CrawlError::InvalidState(format!(
                "controller already ran (phase {})",
                self.phase
            )));
        }

        self.state.start();
        self.transition(CrawlPhase::Running);
        tracing::info!(
            "Crawl started: budget {} pages, {} seed URL(s) queued",
            self.settings.max_pages,
            self.frontier.len()
        );
        self.log_progress();

        let mut workers: JoinSet<FetchOutcome> = JoinSet::new();

        let reason = loop {
            if self.stop.is_stopped() {
                break StopReason::ExternalStop;
            }
            if self.state.budget_reached() {
                break StopReason::BudgetReached;
            }

            self.dispatch(&mut workers).await;

            if workers.is_empty() {
                if self.frontier.is_empty() {
                    break StopReason::FrontierExhausted;
                }
                continue;
            }

            if let Some(joined) = workers.join_next().await {
                self.complete(joined).await;
            }
        };

        self.transition(reason.phase());
        tracing::info!("Crawl stopping: {}", reason);

        if !workers.is_empty() {
            tracing::info!("Waiting for {} in-flight fetch(es)", workers.len());
        }
        while let Some(joined) = workers.join_next().await {
            self.complete(joined).await;
        }

        if let Err(e) = self.sink.flush().await {
            tracing::warn!("Failed to flush records: {}", e);
            self.state.sink_errors += 1;
        }

        let summary = self.build_summary(reason);
        self.transition(CrawlPhase::Closed);
        tracing::info!(
            "Crawl closed: {} pages in {:.1} min ({:.1} pages/min)",
            summary.total_pages,
            summary.duration_minutes(),
            summary.pages_per_minute
        );

        Ok(summary)
    }

    /// Starts fetches while concurrency and budget allow
    async fn dispatch(&mut self, workers: &mut JoinSet<FetchOutcome>) {
        while workers.len() < self.settings.concurrency && !self.stop.is_stopped() {
            if !self.state.try_reserve() {
                break;
            }

            let Some(task) = self.frontier.next() else {
                self.state.release();
                break;
            };

            self.politeness.wait().await;
            if self.stop.is_stopped() {
                self.frontier.requeue(task);
                self.state.release();
                break;
            }
            tracing::debug!("Dispatching #{}: {}", task.order, task.url);

            let fetcher = Arc::clone(&self.fetcher);
            let timeout = self.settings.request_timeout;
            workers.spawn(async move {
                let result = fetcher.fetch(&task.url, timeout).await;
                (task, result)
            });
        }
    }

    /// Handles one finished fetch
    async fn complete(&mut self, joined: Result<FetchOutcome, tokio::task::JoinError>) {
        let (task, result) = match joined {
            Ok(outcome) => outcome,
            Err(e) => {
                self.state.release();
                self.state.fetch_failures += 1;
                tracing::warn!("Fetch task failed: {}", e);
                return;
            }
        };

        let page = match result {
            Ok(page) => page,
            Err(e) => {
                self.state.release();
                self.state.fetch_failures += 1;
                tracing::warn!("Failed to fetch {}: {}", task.url, e);
                return;
            }
        };

        if !self.accept_final_url(&task, &page.final_url) {
            return;
        }

        let output = match self.extract(&page) {
            Ok(output) => output,
            Err(e) => {
                self.state.release();
                self.state.parse_failures += 1;
                tracing::warn!("Failed to parse {}: {}", page.final_url, e);
                return;
            }
        };

        if let Err(e) = self.sink.write(&output.record).await {
            self.state.sink_errors += 1;
            tracing::warn!("Failed to write record for {}: {}", output.record.url, e);
        }

        let admitted = self.admit_links(&output.links, &page.final_url);
        tracing::debug!(
            "Processed #{} {} ({} links, {} queued)",
            output.record.crawl_order,
            output.record.url,
            output.links.len(),
            admitted
        );

        if self.state.progress_due() {
            self.log_progress();
        }
    }

    /// Checks where a redirect landed
    ///
    /// A redirect out of the allowed domains is a fetch failure. A redirect to
    /// a URL already seen is dropped so the same page is not recorded twice.
    fn accept_final_url(&mut self, task: &CrawlTask, final_url: &Url) -> bool {
        let mut normalized = final_url.clone();
        if normalize_parsed(&mut normalized).is_err() || normalized == task.url {
            return true;
        }

        if !self.settings.policy.decide(final_url.as_str()).is_follow() {
            self.state.release();
            self.state.fetch_failures += 1;
            tracing::warn!(
                "Redirect from {} left the crawl scope: {}",
                task.url,
                final_url
            );
            return false;
        }

        if !self.frontier.mark_seen(final_url) {
            self.state.release();
            tracing::debug!("Redirect from {} to already seen {}", task.url, final_url);
            return false;
        }

        true
    }

    /// Parses the page and runs the pipeline
    ///
    /// Kept synchronous: the parsed document is not `Send` and must not live
    /// across an await point.
    fn extract(&mut self, page: &FetchedPage) -> Result<PageOutput, ParseError> {
        let doc =
            Document::parse_with_charset(&page.body, &page.final_url, page.charset.as_deref())?;
        let crawl_order = self.state.commit();
        Ok(self
            .settings
            .pipeline
            .process(&doc, page.status, page.body.len(), crawl_order))
    }

    fn admit_links(&self, links: &[Url], source: &Url) -> usize {
        links
            .iter()
            .filter(|link| self.settings.policy.should_follow(link.as_str(), source))
            .filter(|link| {
                let admitted = self.frontier.try_admit(link);
                if admitted {
                    tracing::debug!("Queued {}", link);
                }
                admitted
            })
            .count()
    }

    fn log_progress(&self) {
        tracing::info!(
            "[Progress] Pages: {}, Time: {:.1} min, Rate: {:.1} pages/min, Frontier: {}",
            self.state.pages_crawled,
            self.state.elapsed().as_secs_f64() / 60.0,
            self.state.pages_per_minute(),
            self.frontier.len()
        );
    }

    fn transition(&mut self, next: CrawlPhase) {
        if !self.phase.can_transition_to(next) {
            tracing::warn!("Unexpected crawl phase change: {} -> {}", self.phase, next);
        }
        tracing::debug!("Crawl phase: {} -> {}", self.phase, next);
        self.phase = next;
    }

    fn build_summary(&self, reason: StopReason) -> CrawlSummary {
        let pages_per_minute = self.state.pages_per_minute();
        CrawlSummary {
            reason,
            started_at: self.state.started_wall,
            finished_at: Utc::now(),
            duration: self.state.elapsed(),
            total_pages: self.state.pages_crawled,
            pages_per_minute,
            fetch_failures: self.state.fetch_failures,
            parse_failures: self.state.parse_failures,
            sink_errors: self.state.sink_errors,
            frontier_remaining: self.frontier.len(),
            seen_urls: self.frontier.seen_count(),
            projection: Projection::from_rate(pages_per_minute),
        }
    }
}
