//! Crawler module for page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - Rate-limited HTTP fetching
//! - HTML parsing and rule-driven extraction
//! - The breadth-first frontier and visited set
//! - Overall crawl coordination

mod coordinator;
mod document;
mod extractor;
mod fetcher;
mod frontier;
mod rules;
mod throttle;

pub use coordinator::{parse_local_file, run_crawl, CrawlSession};
pub use document::{HtmlDocument, MarkupDocument, MarkupElement};
pub use extractor::{
    extract_from_document, extract_page, resolve_reference, PageMetadata, PageRecord,
};
pub use fetcher::{build_http_client, FetchedResource, Fetcher};
pub use frontier::{CrawlTask, Frontier, VisitedSet};
pub use rules::{ExtractionRules, LinkRule, LinkTarget, ResourceKind, SocialPattern};
pub use throttle::{time_until_next_request, RequestThrottle};
