//! Page extraction
//!
//! Turns one parsed document into a [`PageRecord`]: navigable links,
//! resources by kind, and opportunistic metadata (title, description,
//! keywords, contact details, social profiles). Extraction never fails; a
//! category with nothing in it is simply empty.

use crate::crawler::document::{HtmlDocument, MarkupDocument, MarkupElement};
use crate::crawler::rules::{ExtractionRules, LinkTarget, ResourceKind};
use crate::url::normalize_parsed;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use url::Url;

static RE_EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("valid email regex")
});

static RE_PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^\w])((?:\+\d{1,3}[\s.-]?)?\(?\d{3}\)?[\s.-]?\d{3}[\s.-]?\d{4})\b")
        .expect("valid phone regex")
});

/// Opportunistic page metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Vec<String>,
    pub emails: Vec<String>,
    pub phones: Vec<String>,
    /// Platform name → profile URLs
    pub social_links: BTreeMap<String, Vec<String>>,
}

/// Everything extracted from a single page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    /// The page's own URL
    pub url: Url,

    /// Navigable links in document order, normalized and deduplicated
    pub links: Vec<Url>,

    /// Resources by kind, in document order
    pub resources: BTreeMap<ResourceKind, Vec<Url>>,

    pub metadata: PageMetadata,
}

impl PageRecord {
    /// Every resource with its kind, kinds in table order
    pub fn resources_iter(&self) -> impl Iterator<Item = (ResourceKind, &Url)> {
        self.resources
            .iter()
            .flat_map(|(kind, urls)| urls.iter().map(move |u| (*kind, u)))
    }
}

/// Parses HTML and extracts a page record
///
/// `base_url` resolves relative references; it should be the final URL of
/// the response (after redirects). `page_url` is recorded as the page's
/// identity.
///
/// # Example
///
/// ```
/// use utsushi::crawler::{extract_page, ExtractionRules};
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let base = Url::parse("https://example.com/").unwrap();
/// let page = extract_page(html, &base, &base, &ExtractionRules::default());
/// assert_eq!(page.metadata.title.as_deref(), Some("Test"));
/// assert_eq!(page.links[0].as_str(), "https://example.com/page");
/// ```
pub fn extract_page(
    html: &str,
    page_url: &Url,
    base_url: &Url,
    rules: &ExtractionRules,
) -> PageRecord {
    let document = HtmlDocument::parse(html);
    extract_from_document(&document, page_url, base_url, rules)
}

/// Extracts a page record from any markup document
pub fn extract_from_document(
    document: &dyn MarkupDocument,
    page_url: &Url,
    base_url: &Url,
    rules: &ExtractionRules,
) -> PageRecord {
    let mut links: Vec<Url> = Vec::new();
    let mut resources: BTreeMap<ResourceKind, Vec<Url>> = BTreeMap::new();
    let mut metadata = PageMetadata::default();

    document.visit_elements(&mut |element| {
        let tag = element.tag_name().to_ascii_lowercase();

        match tag.as_str() {
            "title" if metadata.title.is_none() => {
                metadata.title = non_empty(element.text().trim());
            }
            "meta" => read_meta(element, &mut metadata),
            _ => {}
        }

        for rule in rules.rules_for(&tag, element.attr("rel")) {
            let Some(raw) = element.attr(&rule.attr) else {
                continue;
            };

            match rule.target {
                LinkTarget::Navigation => {
                    if element.attr("download").is_some() {
                        continue;
                    }
                    if let Some(email) = mailto_address(raw) {
                        for address in email {
                            push_unique(&mut metadata.emails, address);
                        }
                        continue;
                    }
                    if let Some(phone) = tel_number(raw) {
                        push_unique(&mut metadata.phones, phone);
                        continue;
                    }
                    if let Some(url) = resolve_reference(raw, base_url) {
                        if let Some(platform) =
                            url.host_str().and_then(|h| rules.social_platform(h))
                        {
                            push_unique(
                                metadata
                                    .social_links
                                    .entry(platform.to_string())
                                    .or_default(),
                                url.to_string(),
                            );
                        }
                        push_unique(&mut links, url);
                    }
                }
                LinkTarget::Resource(kind) => {
                    if let Some(url) = resolve_reference(raw, base_url) {
                        push_unique(resources.entry(kind).or_default(), url);
                    }
                }
            }
        }
    });

    let text = document.text_content();
    for m in RE_EMAIL.find_iter(&text) {
        push_unique(&mut metadata.emails, m.as_str().to_string());
    }
    for caps in RE_PHONE.captures_iter(&text) {
        if let Some(m) = caps.get(1) {
            push_unique(&mut metadata.phones, m.as_str().trim().to_string());
        }
    }

    PageRecord {
        url: page_url.clone(),
        links,
        resources,
        metadata,
    }
}

fn read_meta(element: &dyn MarkupElement, metadata: &mut PageMetadata) {
    let Some(name) = element.attr("name") else {
        return;
    };
    let Some(content) = element.attr("content") else {
        return;
    };

    if name.eq_ignore_ascii_case("description") && metadata.description.is_none() {
        metadata.description = non_empty(content.trim());
    } else if name.eq_ignore_ascii_case("keywords") {
        for keyword in content.split(',').filter_map(|k| non_empty(k.trim())) {
            push_unique(&mut metadata.keywords, keyword);
        }
    }
}

/// Resolves an attribute value against the base URL
///
/// Returns `None` for references that are not fetchable pages or assets:
/// `javascript:`, `data:`, `mailto:`, `tel:`, fragment-only anchors, and
/// anything that does not resolve to HTTP(S).
pub fn resolve_reference(raw: &str, base_url: &Url) -> Option<Url> {
    let raw = raw.trim();
    if raw.is_empty() || raw.starts_with('#') {
        return None;
    }

    let lower = raw.to_ascii_lowercase();
    if ["javascript:", "data:", "mailto:", "tel:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        return None;
    }

    let absolute = base_url.join(raw).ok()?;
    match normalize_parsed(absolute) {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::debug!("Skipping reference '{}': {}", raw, e);
            None
        }
    }
}

fn mailto_address(raw: &str) -> Option<Vec<String>> {
    let rest = strip_prefix_ignore_case(raw.trim(), "mailto:")?;
    let addresses = rest.split('?').next().unwrap_or_default();
    let decoded = urlencoding::decode(addresses)
        .map(|d| d.into_owned())
        .unwrap_or_else(|_| addresses.to_string());

    Some(
        decoded
            .split(',')
            .filter_map(|a| non_empty(a.trim()))
            .filter(|a| a.contains('@'))
            .collect(),
    )
}

fn tel_number(raw: &str) -> Option<String> {
    let rest = strip_prefix_ignore_case(raw.trim(), "tel:")?;
    let decoded = urlencoding::decode(rest)
        .map(|d| d.into_owned())
        .unwrap_or_else(|_| rest.to_string());
    non_empty(decoded.trim())
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    s.get(..prefix.len())
        .filter(|head| head.eq_ignore_ascii_case(prefix))
        .map(|_| &s[prefix.len()..])
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

fn push_unique<T: PartialEq>(items: &mut Vec<T>, item: T) {
    if !items.contains(&item) {
        items.push(item);
    }
}
