//! JSON report rendering

use crate::output::traits::{OutputResult, ReportRenderer};
use crate::output::CrawlResult;

/// Pretty-printed JSON rendering of the whole crawl result
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReport;

impl ReportRenderer for JsonReport {
    fn render(&self, result: &CrawlResult) -> OutputResult<String> {
        Ok(serde_json::to_string_pretty(result)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{FailureContext, FailureKind, FailureRecord, StopReason};

    #[test]
    fn test_json_report_shape() {
        let mut result = CrawlResult::new("https://example.com/");
        result.internal_links.push("https://example.com/about".to_string());
        result.stop_reason = StopReason::PageLimit;
        result.failures.push(FailureRecord {
            url: "https://example.com/missing".to_string(),
            kind: FailureKind::Http,
            status: Some(404),
            message: "HTTP 404 for https://example.com/missing".to_string(),
            context: FailureContext::Page,
        });

        let json = JsonReport.render(&result).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["seed_url"], "https://example.com/");
        assert_eq!(value["internal_links"][0], "https://example.com/about");
        assert_eq!(value["stop_reason"], "page-limit");
        assert_eq!(value["failures"][0]["kind"], "http");
        assert_eq!(value["failures"][0]["status"], 404);
        assert_eq!(value["failures"][0]["context"], "page");
        assert!(value["mirror"].is_null());
    }

    #[test]
    fn test_write_to_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports/run.json");

        JsonReport
            .write_to(&CrawlResult::new("https://example.com/"), &path)
            .unwrap();

        let written = std::fs::read_to_string(path).unwrap();
        assert!(written.contains("\"seed_url\": \"https://example.com/\""));
    }
}
