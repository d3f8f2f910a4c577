//! Crawl frontier: pending URLs plus the set of every URL ever admitted
//!
//! Admission is a single check-and-insert under one lock, which is the only
//! deduplication guarantee in the crawler: a URL enters the queue at most once
//! for the lifetime of the frontier. Tasks leave in FIFO discovery order,
//! which approximates a breadth-first walk from the seed.

use crate::url::normalize_parsed;
use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard};
use url::Url;

/// A URL accepted for fetching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    /// Normalized absolute URL
    pub url: Url,

    /// Discovery order; the first admitted URL is 0
    pub order: u64,
}

#[derive(Debug, Default)]
struct FrontierInner {
    queue: VecDeque<CrawlTask>,
    seen: HashSet<String>,
    next_order: u64,
}

/// Pending-URL queue with deduplication
///
/// All operations take `&self`, so one frontier can be shared through an
/// `Arc` by several workers.
#[derive(Debug, Default)]
pub struct Frontier {
    inner: Mutex<FrontierInner>,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a frontier holding only the seed URL
    pub fn with_seed(seed: &Url) -> Self {
        let frontier = Self::new();
        frontier.try_admit(seed);
        frontier
    }

    /// Admits a URL unless it was admitted before
    ///
    /// The URL is normalized first, so `https://a.edu/x#top` and
    /// `https://A.edu/x` are the same entry.
    ///
    /// # Returns
    ///
    /// * `true` - The URL was new and is now queued
    /// * `false` - Duplicate (or not normalizable); nothing changed
    pub fn try_admit(&self, url: &Url) -> bool {
        let mut url = url.clone();
        if normalize_parsed(&mut url).is_err() {
            return false;
        }

        let mut inner = self.lock();
        if !inner.seen.insert(url.as_str().to_string()) {
            return false;
        }

        let order = inner.next_order;
        inner.next_order += 1;
        inner.queue.push_back(CrawlTask { url, order });
        true
    }

    /// Records a URL as seen without queueing it
    ///
    /// Used for redirect targets, which are fetched under another URL.
    /// Returns false if the URL was already seen.
    pub fn mark_seen(&self, url: &Url) -> bool {
        let mut url = url.clone();
        if normalize_parsed(&mut url).is_err() {
            return false;
        }
        self.lock().seen.insert(url.as_str().to_string())
    }

    /// Removes and returns the oldest pending task
    pub fn next(&self) -> Option<CrawlTask> {
        self.lock().queue.pop_front()
    }

    /// Puts a dequeued task back at the head of the queue
    ///
    /// The task keeps its discovery order and is not re-checked against the
    /// seen set.
    pub fn requeue(&self, task: CrawlTask) {
        self.lock().queue.push_front(task);
    }

    /// Returns true if no task is pending
    pub fn is_empty(&self) -> bool {
        self.lock().queue.is_empty()
    }

    /// Number of pending tasks
    pub fn len(&self) -> usize {
        self.lock().queue.len()
    }

    /// Number of URLs ever admitted
    pub fn seen_count(&self) -> usize {
        self.lock().seen.len()
    }

    /// Returns true if the URL (after normalization) was ever admitted
    pub fn has_seen(&self, url: &Url) -> bool {
        let mut url = url.clone();
        if normalize_parsed(&mut url).is_err() {
            return false;
        }
        self.lock().seen.contains(url.as_str())
    }

    fn lock(&self) -> MutexGuard<'_, FrontierInner> {
        // Each operation leaves the inner state consistent, so a poisoned
        // lock still guards valid data.
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
