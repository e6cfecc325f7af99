use serde::Deserialize;

/// Main configuration structure for Utsushi
///
/// Every section is optional in the TOML file; missing values fall back to
/// the defaults documented on each field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub mirror: MirrorConfig,
    pub output: OutputConfig,
    /// Extra social platform host patterns, appended to the built-in table
    pub social: Vec<SocialEntry>,
    /// Extra tag/attribute classification rules, appended to the built-in table
    #[serde(rename = "link-rule")]
    pub link_rules: Vec<LinkRuleEntry>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum depth to crawl from the seed URL (seed is depth 0)
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Minimum delay between consecutive network requests (seconds)
    #[serde(rename = "delay-seconds")]
    pub delay_seconds: f64,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-seconds")]
    pub request_timeout_seconds: u64,

    /// Hard ceiling on the number of pages processed in one run
    #[serde(rename = "max-pages")]
    pub max_pages: Option<usize>,

    /// Wall-clock budget for the whole run (seconds)
    #[serde(rename = "max-duration-seconds")]
    pub max_duration_seconds: Option<u64>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 2,
            delay_seconds: 1.0,
            request_timeout_seconds: 30,
            max_pages: None,
            max_duration_seconds: None,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "Utsushi".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header value: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, contact
            ),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

/// Mirror configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MirrorConfig {
    /// Whether to write an offline mirror while crawling
    pub enabled: bool,

    /// Directory the mirror is written into
    #[serde(rename = "root-dir")]
    pub root_dir: String,

    /// Local file whose content replaces matching pages
    #[serde(rename = "index-override")]
    pub index_override: Option<String>,

    /// Which pages the override applies to: "seed", "all" or an absolute URL
    #[serde(rename = "override-scope")]
    pub override_scope: String,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            root_dir: "mirror".to_string(),
            index_override: None,
            override_scope: "seed".to_string(),
        }
    }
}

/// Report output configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Where to write the crawl report (nothing is written when unset)
    #[serde(rename = "report-path")]
    pub report_path: Option<String>,

    /// Report format
    pub format: ReportFormat,
}

/// Supported report formats
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Json,
    Markdown,
}

/// Social platform entry: links whose host matches `domain` are reported
/// under `platform`
#[derive(Debug, Clone, Deserialize)]
pub struct SocialEntry {
    pub platform: String,

    /// Host pattern (e.g., "mastodon.social" or "*.mastodon.social")
    pub domain: String,
}

/// Tag/attribute classification entry
#[derive(Debug, Clone, Deserialize)]
pub struct LinkRuleEntry {
    pub tag: String,
    pub attribute: String,
    /// Only match elements whose `rel` contains this token
    pub rel: Option<String>,
    /// "navigation", "script", "stylesheet" or "image"
    pub kind: String,
}
