//! Crawl session - main traversal orchestration logic
//!
//! This module contains the crawl loop that coordinates all aspects of a
//! run, including:
//! - Pre-flight checks (seed, override file, HTTP client, mirror root)
//! - Breadth-first traversal of the frontier
//! - Content acquisition from the network or an index override
//! - Extraction and result accumulation
//! - Handing pages and resources to the mirror writer
//! - Safety valves (page and wall-clock limits)

use crate::config::Config;
use crate::crawler::extractor::{extract_page, PageRecord};
use crate::crawler::fetcher::Fetcher;
use crate::crawler::frontier::{CrawlTask, Frontier};
use crate::crawler::rules::ExtractionRules;
use crate::index_override::{IndexOverride, OverrideTarget};
use crate::mirror::MirrorWriter;
use crate::output::{
    ContentSource, CrawlResult, FailureContext, FailureRecord, PageVisit, StopReason,
};
use crate::state::TaskState;
use crate::url::{is_same_host, normalize_url};
use crate::{FetchError, UtsushiError};
use chrono::Utc;
use std::collections::HashSet;
use std::path::Path;
use std::time::{Duration, Instant};
use url::Url;

/// Content obtained for one task
struct PageContent {
    body: Vec<u8>,
    /// URL relative references resolve against (final URL after redirects)
    base_url: Url,
    source: ContentSource,
    status_code: Option<u16>,
    content_type: Option<String>,
    is_html: bool,
}

/// One crawl run: owns the frontier, the visited set and the mirror
pub struct CrawlSession {
    config: Config,
    seed: Url,
    rules: ExtractionRules,
    fetcher: Fetcher,
    index_override: Option<IndexOverride>,
    mirror: Option<MirrorWriter>,
    frontier: Frontier,
    results: ResultBuilder,
}

impl CrawlSession {
    /// Creates a session, running every pre-flight check
    ///
    /// # Errors
    ///
    /// * `UtsushiError::InvalidSeed` - the seed is not an absolute HTTP(S) URL
    /// * `UtsushiError::Override` - an override was requested but cannot be loaded
    /// * `UtsushiError::Reqwest` - the HTTP client could not be built
    pub fn new(seed: &str, config: Config) -> Result<Self, UtsushiError> {
        let seed_url = normalize_url(seed).map_err(|source| UtsushiError::InvalidSeed {
            seed: seed.to_string(),
            source,
        })?;

        let index_override = match &config.mirror.index_override {
            Some(path) => {
                let target = OverrideTarget::from_scope(&config.mirror.override_scope, &seed_url)?;
                match IndexOverride::load(Path::new(path), target) {
                    Ok(ov) => Some(ov),
                    Err(e) => {
                        tracing::error!("Cannot start crawl: {}", e);
                        return Err(e.into());
                    }
                }
            }
            None => None,
        };

        let fetcher = Fetcher::from_config(&config)?;
        let rules = ExtractionRules::from_config(&config);

        let mirror = config
            .mirror
            .enabled
            .then(|| {
                MirrorWriter::new(&config.mirror.root_dir, seed_url.clone())
                    .with_rules(rules.clone())
            });

        Ok(Self {
            results: ResultBuilder::new(seed_url.clone()),
            config,
            seed: seed_url,
            rules,
            fetcher,
            index_override,
            mirror,
            frontier: Frontier::new(),
        })
    }

    /// The normalized seed URL
    pub fn seed(&self) -> &Url {
        &self.seed
    }

    /// Runs the traversal loop to completion
    ///
    /// Per-page and per-resource failures are recorded in the result; the
    /// only error this returns is a broken task state machine.
    pub async fn run(mut self) -> Result<CrawlResult, UtsushiError> {
        let start_time = Instant::now();
        let max_pages = self.config.crawler.max_pages;
        let time_budget = self
            .config
            .crawler
            .max_duration_seconds
            .map(Duration::from_secs);

        tracing::info!(
            "Starting crawl of {} (max depth {}, delay {:.2}s, mirror {})",
            self.seed,
            self.config.crawler.max_depth,
            self.config.crawler.delay_seconds,
            if self.mirror.is_some() { "on" } else { "off" }
        );

        self.frontier.enqueue(self.seed.clone(), 0);
        let mut pages_processed: usize = 0;

        let stop_reason = loop {
            if self.frontier.is_empty() {
                break StopReason::FrontierExhausted;
            }
            if max_pages.is_some_and(|max| pages_processed >= max) {
                tracing::warn!(
                    "Page limit reached, {} tasks left unprocessed",
                    self.frontier.len()
                );
                break StopReason::PageLimit;
            }
            if time_budget.is_some_and(|budget| start_time.elapsed() >= budget) {
                tracing::warn!(
                    "Time budget exhausted, {} tasks left unprocessed",
                    self.frontier.len()
                );
                break StopReason::TimeBudget;
            }

            let Some(task) = self.frontier.pop() else {
                break StopReason::FrontierExhausted;
            };

            self.process_task(task).await?;
            pages_processed += 1;

            if pages_processed % 10 == 0 {
                let elapsed = start_time.elapsed();
                tracing::info!(
                    "Progress: {} pages processed, {} in frontier, {:.2} pages/sec",
                    pages_processed,
                    self.frontier.len(),
                    pages_processed as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
                );
            }
        };

        let mirror_report = match self.mirror.take() {
            Some(writer) => {
                let index_path = match writer.write_index().await {
                    Ok(path) => Some(path),
                    Err(e) => {
                        tracing::warn!("Failed to write mirror index: {}", e);
                        let url = writer.root().display().to_string();
                        self.results.record_failure(FailureRecord::from_mirror(&url, &e));
                        None
                    }
                };
                Some(writer.report(index_path))
            }
            None => None,
        };

        let mut result = self.results.finish();
        result.visited_count = self.frontier.visited_len();
        result.stop_reason = stop_reason;
        result.mirror = mirror_report;

        tracing::info!(
            "Crawl completed: {} pages processed in {:?} ({} failures)",
            pages_processed,
            start_time.elapsed(),
            result.failures.len()
        );

        Ok(result)
    }

    /// Processes a single task through the state machine
    async fn process_task(&mut self, task: CrawlTask) -> Result<(), UtsushiError> {
        let mut state = TaskState::Queued;
        tracing::debug!("Processing {} (depth {})", task.url, task.depth);

        advance(&mut state, TaskState::Fetching)?;
        let content = match self.obtain_content(&task.url).await {
            Ok(content) => content,
            Err(e) => {
                advance(&mut state, TaskState::Failed)?;
                tracing::warn!("Failed to fetch {}: {}", task.url, e);
                self.results
                    .record_failure(FailureRecord::from_fetch(&e, FailureContext::Page));
                self.results.record_visit(PageVisit {
                    url: task.url.to_string(),
                    depth: task.depth,
                    state,
                    source: ContentSource::Network,
                    status_code: e.status(),
                    content_type: None,
                    title: None,
                    local_path: None,
                });
                return Ok(());
            }
        };

        if !content.is_html {
            tracing::debug!(
                "Not parsing {} ({})",
                task.url,
                content.content_type.as_deref().unwrap_or("unknown type")
            );
            let local_path = self.mirror_raw(&task.url, &content.body).await;
            advance(&mut state, TaskState::Done)?;
            self.results
                .record_visit(visit(&task, &content, state, None, local_path));
            return Ok(());
        }

        let html = String::from_utf8_lossy(&content.body).into_owned();
        let record = extract_page(&html, &task.url, &content.base_url, &self.rules);
        advance(&mut state, TaskState::Extracted)?;
        self.results.merge_page(&record, task.depth == 0);

        if task.depth < self.config.crawler.max_depth {
            advance(&mut state, TaskState::EnqueuingChildren)?;
            self.enqueue_children(&record, task.depth + 1);
        }

        let local_path = self.mirror_page(&task.url, &content.base_url, &html, &record).await;

        advance(&mut state, TaskState::Done)?;
        let title = record.metadata.title.clone();
        self.results
            .record_visit(visit(&task, &content, state, title, local_path));

        Ok(())
    }

    /// Uses the override when one applies, otherwise the network
    async fn obtain_content(&self, url: &Url) -> Result<PageContent, FetchError> {
        if let Some(content) = self.index_override.as_ref().and_then(|o| o.resolve(url)) {
            tracing::debug!("Using index override for {}", url);
            return Ok(PageContent {
                body: content.as_bytes().to_vec(),
                base_url: url.clone(),
                source: ContentSource::Override,
                status_code: None,
                content_type: Some("text/html".to_string()),
                is_html: true,
            });
        }

        let fetched = self.fetcher.fetch(url).await?;
        let is_html = fetched.is_html();
        Ok(PageContent {
            base_url: fetched.final_url,
            source: ContentSource::Network,
            status_code: Some(fetched.status_code),
            content_type: fetched.content_type,
            body: fetched.body,
            is_html,
        })
    }

    /// Enqueues same-host links in document order
    fn enqueue_children(&mut self, record: &PageRecord, depth: u32) {
        let mut added = 0;
        for link in &record.links {
            if !is_same_host(&self.seed, link) {
                continue;
            }
            if self.frontier.enqueue(link.clone(), depth) {
                added += 1;
            }
        }
        tracing::debug!("Enqueued {} new URLs from {}", added, record.url);
    }

    async fn mirror_page(
        &mut self,
        url: &Url,
        base_url: &Url,
        html: &str,
        record: &PageRecord,
    ) -> Option<String> {
        let writer = self.mirror.as_mut()?;

        let local_path = match writer.mirror_page(url, base_url, html).await {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!("Failed to mirror {}: {}", url, e);
                self.results
                    .record_failure(FailureRecord::from_mirror(url.as_str(), &e));
                None
            }
        };

        for (kind, resource) in record.resources_iter() {
            if !writer.is_mirrored_host(resource) || writer.already_attempted(resource) {
                continue;
            }
            if let Err(e) = writer.mirror_resource(&self.fetcher, resource, kind).await {
                tracing::warn!("Failed to mirror {} {}: {}", kind, resource, e);
                self.results
                    .record_failure(FailureRecord::from_mirror(resource.as_str(), &e));
            }
        }

        local_path
    }

    async fn mirror_raw(&mut self, url: &Url, body: &[u8]) -> Option<String> {
        let writer = self.mirror.as_mut()?;
        match writer.mirror_raw(url, body).await {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!("Failed to mirror {}: {}", url, e);
                self.results
                    .record_failure(FailureRecord::from_mirror(url.as_str(), &e));
                None
            }
        }
    }
}

/// Runs a complete crawl
///
/// # Example
///
/// ```no_run
/// use utsushi::{run_crawl, Config};
///
/// # async fn example() -> utsushi::Result<()> {
/// let result = run_crawl("https://example.com/", Config::default()).await?;
/// println!("{} pages", result.pages.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(seed: &str, config: Config) -> Result<CrawlResult, UtsushiError> {
    CrawlSession::new(seed, config)?.run().await
}

/// Extracts a single HTML document from disk
///
/// Relative references resolve against `base_url`, or the file's own
/// `file://` URL when none is given.
pub fn parse_local_file(
    path: &Path,
    base_url: Option<&Url>,
    rules: &ExtractionRules,
) -> Result<CrawlResult, UtsushiError> {
    let document_error = |source: std::io::Error| UtsushiError::Document {
        path: path.to_path_buf(),
        source,
    };

    let html = std::fs::read_to_string(path).map_err(document_error)?;

    let base = match base_url {
        Some(url) => url.clone(),
        None => {
            let absolute = path.canonicalize().map_err(document_error)?;
            Url::from_file_path(&absolute).map_err(|_| {
                document_error(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "path cannot be expressed as a file URL",
                ))
            })?
        }
    };

    tracing::info!("Parsing {} (base {})", path.display(), base);
    let record = extract_page(&html, &base, &base, rules);

    let mut results = ResultBuilder::new(base.clone());
    results.merge_page(&record, true);
    results.record_visit(PageVisit {
        url: base.to_string(),
        depth: 0,
        state: TaskState::Done,
        source: ContentSource::File,
        status_code: None,
        content_type: Some("text/html".to_string()),
        title: record.metadata.title.clone(),
        local_path: None,
    });

    let mut result = results.finish();
    result.visited_count = 1;
    Ok(result)
}

/// Moves a task to `next`, rejecting transitions the state machine forbids
fn advance(state: &mut TaskState, next: TaskState) -> Result<(), UtsushiError> {
    if !state.can_transition_to(next) {
        return Err(UtsushiError::InvalidTransition {
            from: *state,
            to: next,
        });
    }
    *state = next;
    Ok(())
}

fn visit(
    task: &CrawlTask,
    content: &PageContent,
    state: TaskState,
    title: Option<String>,
    local_path: Option<String>,
) -> PageVisit {
    PageVisit {
        url: task.url.to_string(),
        depth: task.depth,
        state,
        source: content.source,
        status_code: content.status_code,
        content_type: content.content_type.clone(),
        title,
        local_path,
    }
}

/// Accumulates page records into a crawl result, deduplicating in
/// first-seen order
struct ResultBuilder {
    seed: Url,
    result: CrawlResult,
    seen_links: HashSet<String>,
    seen_resources: HashSet<String>,
    seen_emails: HashSet<String>,
    seen_phones: HashSet<String>,
    seen_social: HashSet<String>,
}

impl ResultBuilder {
    fn new(seed: Url) -> Self {
        Self {
            result: CrawlResult::new(seed.as_str()),
            seed,
            seen_links: HashSet::new(),
            seen_resources: HashSet::new(),
            seen_emails: HashSet::new(),
            seen_phones: HashSet::new(),
            seen_social: HashSet::new(),
        }
    }

    fn merge_page(&mut self, record: &PageRecord, is_seed: bool) {
        if is_seed {
            self.result.seed_metadata = record.metadata.clone();
        }

        for link in &record.links {
            if !self.seen_links.insert(link.to_string()) {
                continue;
            }
            if is_same_host(&self.seed, link) {
                self.result.internal_links.push(link.to_string());
            } else {
                self.result.external_links.push(link.to_string());
            }
        }

        for (kind, url) in record.resources_iter() {
            if self.seen_resources.insert(url.to_string()) {
                self.result
                    .resources
                    .entry(kind)
                    .or_default()
                    .push(url.to_string());
            }
        }

        for email in &record.metadata.emails {
            if self.seen_emails.insert(email.to_ascii_lowercase()) {
                self.result.emails.push(email.clone());
            }
        }

        for phone in &record.metadata.phones {
            if self.seen_phones.insert(phone.clone()) {
                self.result.phones.push(phone.clone());
            }
        }

        for (platform, links) in &record.metadata.social_links {
            for link in links {
                if self.seen_social.insert(link.clone()) {
                    self.result
                        .social_links
                        .entry(platform.clone())
                        .or_default()
                        .push(link.clone());
                }
            }
        }
    }

    fn record_visit(&mut self, visit: PageVisit) {
        self.result.pages.push(visit);
    }

    fn record_failure(&mut self, failure: FailureRecord) {
        self.result.failures.push(failure);
    }

    fn finish(mut self) -> CrawlResult {
        self.result.finished_at = Some(Utc::now());
        self.result
    }
}
