//! Output module for crawl results and reports
//!
//! This module handles:
//! - The plain-value crawl result produced by every run
//! - Rendering results as JSON or markdown reports
//! - Printing console statistics

mod json;
mod markdown;
mod result;
pub mod stats;
mod traits;

pub use json::JsonReport;
pub use markdown::{format_markdown_report, MarkdownReport};
pub use result::{
    ContentSource, CrawlResult, FailureContext, FailureKind, FailureRecord, MirrorReport,
    PageVisit, StopReason,
};
pub use stats::{print_statistics, print_summary, CrawlStatistics};
pub use traits::{OutputError, OutputResult, ReportRenderer};

use crate::config::ReportFormat;
use std::path::Path;

/// Returns the renderer for a configured report format
pub fn renderer_for(format: ReportFormat) -> Box<dyn ReportRenderer> {
    match format {
        ReportFormat::Json => Box::new(JsonReport),
        ReportFormat::Markdown => Box::new(MarkdownReport),
    }
}

/// Writes `result` to `path` in the given format
pub fn write_report(result: &CrawlResult, path: &Path, format: ReportFormat) -> OutputResult<()> {
    renderer_for(format).write_to(result, path)?;
    tracing::info!("Wrote {:?} report to {}", format, path.display());
    Ok(())
}
