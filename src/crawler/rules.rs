//! Extraction rule tables
//!
//! Which tag/attribute pairs produce navigable links or resources, and which
//! hosts count as social platforms, is data rather than code. The built-in
//! tables cover common HTML; configuration can append to both.

use crate::config::Config;
use crate::url::matches_host_pattern;
use serde::Serialize;

/// Kind of a non-navigational asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Script,
    Stylesheet,
    Image,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Script => "script",
            Self::Stylesheet => "stylesheet",
            Self::Image => "image",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a matched attribute value is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkTarget {
    /// A page the frontier may follow
    Navigation,
    /// An asset downloaded alongside pages when mirroring
    Resource(ResourceKind),
}

impl LinkTarget {
    /// Parses a rule kind name as used in configuration files
    pub fn parse(kind: &str) -> Option<Self> {
        match kind.trim().to_ascii_lowercase().as_str() {
            "navigation" | "link" | "page" => Some(Self::Navigation),
            "script" => Some(Self::Resource(ResourceKind::Script)),
            "stylesheet" | "css" => Some(Self::Resource(ResourceKind::Stylesheet)),
            "image" | "img" => Some(Self::Resource(ResourceKind::Image)),
            _ => None,
        }
    }
}

/// One tag/attribute classification rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRule {
    pub tag: String,
    pub attr: String,
    /// Required `rel` token (case-insensitive), if any
    pub rel: Option<String>,
    pub target: LinkTarget,
}

impl LinkRule {
    pub fn new(tag: &str, attr: &str, rel: Option<&str>, target: LinkTarget) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attr: attr.to_ascii_lowercase(),
            rel: rel.map(str::to_ascii_lowercase),
            target,
        }
    }

    /// Returns true if an element with this tag and `rel` value is covered
    pub fn matches(&self, tag: &str, rel: Option<&str>) -> bool {
        if !self.tag.eq_ignore_ascii_case(tag) {
            return false;
        }

        match &self.rel {
            None => true,
            Some(required) => rel
                .map(|value| {
                    value
                        .split_ascii_whitespace()
                        .any(|token| token.eq_ignore_ascii_case(required))
                })
                .unwrap_or(false),
        }
    }
}

/// A social platform and the host patterns that identify it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocialPattern {
    pub platform: String,
    pub hosts: Vec<String>,
}

impl SocialPattern {
    pub fn new(platform: &str, hosts: &[&str]) -> Self {
        Self {
            platform: platform.to_string(),
            hosts: hosts.iter().map(|h| h.to_string()).collect(),
        }
    }

    pub fn matches(&self, host: &str) -> bool {
        self.hosts.iter().any(|p| matches_host_pattern(p, host))
    }
}

/// Complete rule set handed to the extractor
#[derive(Debug, Clone)]
pub struct ExtractionRules {
    pub links: Vec<LinkRule>,
    pub social: Vec<SocialPattern>,
}

impl Default for ExtractionRules {
    fn default() -> Self {
        use LinkTarget::{Navigation, Resource};

        let links = vec![
            LinkRule::new("a", "href", None, Navigation),
            LinkRule::new("area", "href", None, Navigation),
            LinkRule::new("link", "href", Some("canonical"), Navigation),
            LinkRule::new("script", "src", None, Resource(ResourceKind::Script)),
            LinkRule::new(
                "link",
                "href",
                Some("stylesheet"),
                Resource(ResourceKind::Stylesheet),
            ),
            LinkRule::new("img", "src", None, Resource(ResourceKind::Image)),
            LinkRule::new("link", "href", Some("icon"), Resource(ResourceKind::Image)),
        ];

        let social = vec![
            SocialPattern::new("facebook", &["*.facebook.com", "*.fb.com"]),
            SocialPattern::new("twitter", &["*.twitter.com", "*.x.com"]),
            SocialPattern::new("linkedin", &["*.linkedin.com"]),
            SocialPattern::new("instagram", &["*.instagram.com"]),
            SocialPattern::new("youtube", &["*.youtube.com", "youtu.be"]),
            SocialPattern::new("github", &["*.github.com"]),
            SocialPattern::new("tiktok", &["*.tiktok.com"]),
            SocialPattern::new("pinterest", &["*.pinterest.com"]),
        ];

        Self { links, social }
    }
}

impl ExtractionRules {
    /// Built-in tables extended with the configured `[[link-rule]]` and
    /// `[[social]]` entries
    ///
    /// Entries with an unknown kind are skipped; validation rejects them
    /// before a session is built.
    pub fn from_config(config: &Config) -> Self {
        let mut rules = Self::default();

        for entry in &config.link_rules {
            if let Some(target) = LinkTarget::parse(&entry.kind) {
                rules.links.push(LinkRule::new(
                    &entry.tag,
                    &entry.attribute,
                    entry.rel.as_deref(),
                    target,
                ));
            }
        }

        for entry in &config.social {
            match rules
                .social
                .iter_mut()
                .find(|s| s.platform.eq_ignore_ascii_case(&entry.platform))
            {
                Some(existing) => existing.hosts.push(entry.domain.clone()),
                None => rules
                    .social
                    .push(SocialPattern::new(&entry.platform, &[entry.domain.as_str()])),
            }
        }

        rules
    }

    /// Rules that apply to an element, in table order
    pub fn rules_for<'a>(
        &'a self,
        tag: &'a str,
        rel: Option<&'a str>,
    ) -> impl Iterator<Item = &'a LinkRule> + 'a {
        self.links.iter().filter(move |r| r.matches(tag, rel))
    }

    /// Platform name for a host, if it belongs to a known social network
    pub fn social_platform(&self, host: &str) -> Option<&str> {
        self.social
            .iter()
            .find(|s| s.matches(host))
            .map(|s| s.platform.as_str())
    }
}
