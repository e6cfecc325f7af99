//! Markdown report generation
//!
//! This module generates a human-readable markdown report of a crawl,
//! including page outcomes, discovered links and resources, contact
//! details, failures and the mirror manifest.

use crate::output::traits::{OutputResult, ReportRenderer};
use crate::output::CrawlResult;

/// Number of links listed per section before truncating
const LIST_LIMIT: usize = 50;

/// Markdown rendering of the crawl result
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownReport;

impl ReportRenderer for MarkdownReport {
    fn render(&self, result: &CrawlResult) -> OutputResult<String> {
        Ok(format_markdown_report(result))
    }
}

/// Formats a crawl result as markdown
pub fn format_markdown_report(result: &CrawlResult) -> String {
    let mut md = String::new();

    md.push_str("# Utsushi Crawl Report\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Seed**: {}\n", result.seed_url));
    md.push_str(&format!("- **Started**: {}\n", result.started_at.to_rfc3339()));
    if let Some(finished) = &result.finished_at {
        md.push_str(&format!("- **Finished**: {}\n", finished.to_rfc3339()));
        let duration = (*finished - result.started_at).num_milliseconds() as f64 / 1000.0;
        md.push_str(&format!("- **Duration**: {:.1} seconds\n", duration));
    }
    md.push_str(&format!("- **Stopped because**: {:?}\n\n", result.stop_reason));

    // Seed metadata
    let meta = &result.seed_metadata;
    if meta.title.is_some() || meta.description.is_some() || !meta.keywords.is_empty() {
        md.push_str("## Site Information\n\n");
        if let Some(title) = &meta.title {
            md.push_str(&format!("- **Title**: {}\n", title));
        }
        if let Some(description) = &meta.description {
            md.push_str(&format!("- **Description**: {}\n", description));
        }
        if !meta.keywords.is_empty() {
            md.push_str(&format!("- **Keywords**: {}\n", meta.keywords.join(", ")));
        }
        md.push('\n');
    }

    // Overall statistics
    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Pages Processed**: {}\n", result.pages.len()));
    md.push_str(&format!("- **Pages Succeeded**: {}\n", result.pages_done()));
    md.push_str(&format!("- **Unique URLs Visited**: {}\n", result.visited_count));
    md.push_str(&format!(
        "- **Max Depth Reached**: {}\n",
        result.max_depth_reached()
    ));
    md.push_str(&format!(
        "- **Internal Links**: {}\n",
        result.internal_links.len()
    ));
    md.push_str(&format!(
        "- **External Links**: {}\n",
        result.external_links.len()
    ));
    md.push_str(&format!("- **Resources**: {}\n", result.resource_count()));
    md.push_str(&format!("- **Failures**: {}\n\n", result.failures.len()));

    // Pages
    if !result.pages.is_empty() {
        md.push_str("## Pages\n\n");
        md.push_str("| URL | Depth | State | Status | Title |\n");
        md.push_str("|-----|-------|-------|--------|-------|\n");
        for page in &result.pages {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                page.url,
                page.depth,
                page.state,
                page.status_code
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                escape_cell(page.title.as_deref().unwrap_or(""))
            ));
        }
        md.push('\n');
    }

    push_link_list(&mut md, "External Links", &result.external_links);

    // Resources
    if !result.resources.is_empty() {
        md.push_str("## Resources\n\n");
        md.push_str("| Kind | Count |\n");
        md.push_str("|------|-------|\n");
        for (kind, urls) in &result.resources {
            md.push_str(&format!("| {} | {} |\n", kind, urls.len()));
        }
        md.push('\n');
    }

    // Contacts
    if !result.emails.is_empty() || !result.phones.is_empty() || !result.social_links.is_empty()
    {
        md.push_str("## Contact Information\n\n");
        for email in &result.emails {
            md.push_str(&format!("- Email: {}\n", email));
        }
        for phone in &result.phones {
            md.push_str(&format!("- Phone: {}\n", phone));
        }
        for (platform, links) in &result.social_links {
            for link in links {
                md.push_str(&format!("- {}: {}\n", platform, link));
            }
        }
        md.push('\n');
    }

    // Failures
    if !result.failures.is_empty() {
        md.push_str("## Failures\n\n");
        md.push_str("| URL | Context | Kind | Status | Message |\n");
        md.push_str("|-----|---------|------|--------|---------|\n");
        for failure in &result.failures {
            md.push_str(&format!(
                "| {} | {:?} | {:?} | {} | {} |\n",
                failure.url,
                failure.context,
                failure.kind,
                failure
                    .status
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                escape_cell(&failure.message)
            ));
        }
        md.push('\n');
    }

    // Mirror
    if let Some(mirror) = &result.mirror {
        md.push_str("## Mirror\n\n");
        md.push_str(&format!("- **Root**: {}\n", mirror.root.display()));
        if let Some(index) = &mirror.index_path {
            md.push_str(&format!("- **Index**: {}\n", index.display()));
        }
        md.push_str(&format!(
            "- **Files Stored**: {} of {}\n\n",
            mirror.stored_count(),
            mirror.manifest.len()
        ));
    }

    md
}

fn push_link_list(md: &mut String, heading: &str, links: &[String]) {
    if links.is_empty() {
        return;
    }

    md.push_str(&format!("## {}\n\n", heading));
    for link in links.iter().take(LIST_LIMIT) {
        md.push_str(&format!("- {}\n", link));
    }
    if links.len() > LIST_LIMIT {
        md.push_str(&format!("\n... and {} more\n", links.len() - LIST_LIMIT));
    }
    md.push('\n');
}

fn escape_cell(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ")
}
