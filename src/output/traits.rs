//! Report renderer trait and errors
//!
//! A renderer turns a finished [`CrawlResult`] into a document. Renderers
//! never touch the network or the mirror; the result is a plain value.

use crate::output::CrawlResult;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to format output: {0}")]
    Format(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for OutputError {
    fn from(e: serde_json::Error) -> Self {
        Self::Format(e.to_string())
    }
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Trait for report renderers
pub trait ReportRenderer {
    /// Renders the full report
    fn render(&self, result: &CrawlResult) -> OutputResult<String>;

    /// Renders the report and writes it to `path`, creating parent directories
    fn write_to(&self, result: &CrawlResult, path: &Path) -> OutputResult<()> {
        let rendered = self.render(result)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, rendered)?;
        Ok(())
    }
}
