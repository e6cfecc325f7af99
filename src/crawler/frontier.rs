//! Breadth-first frontier
//!
//! The frontier owns the FIFO task queue and the visited set. A URL enters
//! the visited set exactly once, at enqueue time, so two pages linking to the
//! same child can never queue it twice.

use std::collections::{HashSet, VecDeque};
use url::Url;

/// A unit of traversal work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    /// Normalized absolute URL
    pub url: Url,

    /// Distance from the seed (seed is 0)
    pub depth: u32,
}

/// Set of normalized URLs that have ever been enqueued
#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: HashSet<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a URL, returning true if it was not already present
    ///
    /// Check and insert are a single operation on the underlying set.
    pub fn insert(&mut self, url: &Url) -> bool {
        self.urls.insert(url.as_str().to_string())
    }

    pub fn contains(&self, url: &Url) -> bool {
        self.urls.contains(url.as_str())
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// FIFO queue of crawl tasks plus the visited set
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<CrawlTask>,
    visited: VisitedSet,
    processed: HashSet<String>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues `url` at `depth` unless it was seen before
    ///
    /// Returns true if the task was queued.
    pub fn enqueue(&mut self, url: Url, depth: u32) -> bool {
        if !self.visited.insert(&url) {
            return false;
        }
        self.queue.push_back(CrawlTask { url, depth });
        true
    }

    /// Pops the next task that has not been processed yet
    pub fn pop(&mut self) -> Option<CrawlTask> {
        while let Some(task) = self.queue.pop_front() {
            if self.processed.insert(task.url.as_str().to_string()) {
                return Some(task);
            }
            tracing::debug!("Skipping already processed {}", task.url);
        }
        None
    }

    /// Tasks still waiting in the queue
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of distinct URLs ever enqueued
    pub fn visited_len(&self) -> usize {
        self.visited.len()
    }

    pub fn is_visited(&self, url: &Url) -> bool {
        self.visited.contains(url)
    }

    /// Number of tasks handed out by [`Frontier::pop`]
    pub fn processed_len(&self) -> usize {
        self.processed.len()
    }
}
