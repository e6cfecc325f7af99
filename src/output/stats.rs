//! Console statistics for a finished crawl
//!
//! This module condenses a crawl result into counts and prints them.

use crate::output::{CrawlResult, FailureContext};
use std::collections::BTreeMap;

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    pub pages_processed: usize,
    pub pages_done: usize,
    pub pages_failed: usize,
    pub visited: usize,
    pub internal_links: usize,
    pub external_links: usize,

    /// Resource kind name → count
    pub resources_by_kind: BTreeMap<String, usize>,

    pub emails: usize,
    pub phones: usize,
    pub social_links: usize,

    /// Failure context → count
    pub failures_by_context: BTreeMap<String, usize>,

    /// (stored, total) manifest entries, when mirroring
    pub mirror_files: Option<(usize, usize)>,
}

impl CrawlStatistics {
    /// Computes statistics from a crawl result
    pub fn from_result(result: &CrawlResult) -> Self {
        let mut failures_by_context = BTreeMap::new();
        for failure in &result.failures {
            let key = match failure.context {
                FailureContext::Page => "page",
                FailureContext::Resource => "resource",
                FailureContext::MirrorWrite => "mirror-write",
            };
            *failures_by_context.entry(key.to_string()).or_insert(0) += 1;
        }

        Self {
            pages_processed: result.pages.len(),
            pages_done: result.pages_done(),
            pages_failed: result.pages.len() - result.pages_done(),
            visited: result.visited_count,
            internal_links: result.internal_links.len(),
            external_links: result.external_links.len(),
            resources_by_kind: result
                .resources
                .iter()
                .map(|(kind, urls)| (kind.to_string(), urls.len()))
                .collect(),
            emails: result.emails.len(),
            phones: result.phones.len(),
            social_links: result.social_links.values().map(Vec::len).sum(),
            failures_by_context,
            mirror_files: result
                .mirror
                .as_ref()
                .map(|m| (m.stored_count(), m.manifest.len())),
        }
    }

    /// Success rate over processed pages, as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.pages_processed == 0 {
            return 0.0;
        }
        (self.pages_done as f64 / self.pages_processed as f64) * 100.0
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Pages processed: {}", stats.pages_processed);
    println!("  Unique URLs visited: {}", stats.visited);
    println!("  Internal links: {}", stats.internal_links);
    println!("  External links: {}", stats.external_links);
    println!();

    if !stats.resources_by_kind.is_empty() {
        println!("Resources:");
        for (kind, count) in &stats.resources_by_kind {
            println!("  {}: {}", kind, count);
        }
        println!();
    }

    println!("Contacts:");
    println!("  Emails: {}", stats.emails);
    println!("  Phones: {}", stats.phones);
    println!("  Social links: {}", stats.social_links);
    println!();

    if !stats.failures_by_context.is_empty() {
        println!("Failures:");
        for (context, count) in &stats.failures_by_context {
            println!("  {}: {}", context, count);
        }
        println!();
    }

    if let Some((stored, total)) = stats.mirror_files {
        println!("Mirror: {} of {} files stored", stored, total);
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} pages successfully processed)",
        stats.success_rate(),
        stats.pages_done,
        stats.pages_processed
    );
}

/// Computes and prints statistics for a crawl result
pub fn print_summary(result: &CrawlResult) {
    print_statistics(&CrawlStatistics::from_result(result));
}
