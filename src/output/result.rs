//! Crawl result types
//!
//! The crawl result is a plain value: it holds no network or file handles, so
//! report writers can serialize it without touching the engine again.

use crate::crawler::{PageMetadata, ResourceKind};
use crate::mirror::ManifestEntry;
use crate::state::TaskState;
use crate::{FetchError, MirrorError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Aggregate output of one crawl (or one local document parse)
#[derive(Debug, Clone, Serialize)]
pub struct CrawlResult {
    /// The seed URL as normalized by the session
    pub seed_url: String,

    /// Metadata of the seed page (empty if the seed could not be fetched)
    pub seed_metadata: PageMetadata,

    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,

    /// Every processed task, in processing order
    pub pages: Vec<PageVisit>,

    /// Same-host navigable links, first-seen order
    pub internal_links: Vec<String>,

    /// Off-host navigable links, first-seen order (never fetched)
    pub external_links: Vec<String>,

    /// Resources by kind, first-seen order
    pub resources: BTreeMap<ResourceKind, Vec<String>>,

    pub emails: Vec<String>,
    pub phones: Vec<String>,

    /// Social links by platform name
    pub social_links: BTreeMap<String, Vec<String>>,

    /// Per-URL failure log
    pub failures: Vec<FailureRecord>,

    /// Number of unique same-host URLs ever enqueued (including the seed)
    pub visited_count: usize,

    pub stop_reason: StopReason,

    /// Present when mirroring was enabled
    pub mirror: Option<MirrorReport>,
}

impl CrawlResult {
    /// Creates an empty result for the given seed
    pub fn new(seed_url: impl Into<String>) -> Self {
        Self {
            seed_url: seed_url.into(),
            seed_metadata: PageMetadata::default(),
            started_at: Utc::now(),
            finished_at: None,
            pages: Vec::new(),
            internal_links: Vec::new(),
            external_links: Vec::new(),
            resources: BTreeMap::new(),
            emails: Vec::new(),
            phones: Vec::new(),
            social_links: BTreeMap::new(),
            failures: Vec::new(),
            visited_count: 0,
            stop_reason: StopReason::FrontierExhausted,
            mirror: None,
        }
    }

    /// Number of pages that finished successfully
    pub fn pages_done(&self) -> usize {
        self.pages.iter().filter(|p| p.state.is_success()).count()
    }

    /// Largest depth among processed pages
    pub fn max_depth_reached(&self) -> u32 {
        self.pages.iter().map(|p| p.depth).max().unwrap_or(0)
    }

    /// Total resources discovered across all kinds
    pub fn resource_count(&self) -> usize {
        self.resources.values().map(Vec::len).sum()
    }
}

/// Where a page's content came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentSource {
    Network,
    Override,
    File,
}

/// One processed crawl task
#[derive(Debug, Clone, Serialize)]
pub struct PageVisit {
    pub url: String,
    pub depth: u32,
    pub state: TaskState,
    pub source: ContentSource,
    pub status_code: Option<u16>,
    pub content_type: Option<String>,
    pub title: Option<String>,

    /// Mirror path relative to the mirror root, when the page was written
    pub local_path: Option<String>,
}

/// Failure categories, matching the error taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    Network,
    Http,
    Write,
}

/// What was being done when a failure happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureContext {
    Page,
    Resource,
    MirrorWrite,
}

/// A single entry of the per-URL failure log
#[derive(Debug, Clone, Serialize)]
pub struct FailureRecord {
    pub url: String,
    pub kind: FailureKind,
    pub status: Option<u16>,
    pub message: String,
    pub context: FailureContext,
}

impl FailureRecord {
    /// Record for a failed network retrieval
    pub fn from_fetch(error: &FetchError, context: FailureContext) -> Self {
        Self {
            url: error.url().to_string(),
            kind: error.kind(),
            status: error.status(),
            message: error.to_string(),
            context,
        }
    }

    /// Record for a failed mirror download or write of `url`
    pub fn from_mirror(url: &str, error: &MirrorError) -> Self {
        match error {
            MirrorError::Download(e) => Self::from_fetch(e, FailureContext::Resource),
            MirrorError::Write { .. } => Self {
                url: url.to_string(),
                kind: error.kind(),
                status: None,
                message: error.to_string(),
                context: FailureContext::MirrorWrite,
            },
        }
    }
}

/// Why the traversal loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StopReason {
    FrontierExhausted,
    PageLimit,
    TimeBudget,
}

/// Mirror section of the crawl result
#[derive(Debug, Clone, Serialize)]
pub struct MirrorReport {
    pub root: PathBuf,

    /// Path of the generated navigation page, if it could be written
    pub index_path: Option<PathBuf>,

    /// Remote URL → local path, in assignment order
    pub manifest: Vec<ManifestEntry>,
}

impl MirrorReport {
    /// Number of manifest entries actually stored on disk
    pub fn stored_count(&self) -> usize {
        self.manifest.iter().filter(|e| e.is_stored()).count()
    }
}
