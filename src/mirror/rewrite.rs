//! Attribute-level link rewriting
//!
//! Only attribute values that the extraction rules classify as links or
//! resources are touched; every other byte of the document is copied through
//! unchanged. Comments and the bodies of `<script>`/`<style>` elements are
//! opaque, so markup mentioned there is never rewritten.

use crate::crawler::{resolve_reference, ExtractionRules, LinkRule, LinkTarget};
use regex::{Captures, Regex};
use std::sync::LazyLock;
use url::Url;

static RE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"<([a-zA-Z][\w-]*)((?:\s+[^\s"'>/=]+(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s"'>]+))?)*)\s*/?>"#,
    )
    .expect("valid tag regex")
});

static RE_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(\s+)([^\s"'>/=]+)(?:(\s*=\s*)("[^"]*"|'[^']*'|[^\s"'>]+))?"#)
        .expect("valid attribute regex")
});

/// Comments, and raw-text elements with their opening tag captured
static RE_OPAQUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)<!--.*?(?:-->|\z)|(<script\b[^>]*>).*?(?:</script\s*>|\z)|(<style\b[^>]*>).*?(?:</style\s*>|\z)",
    )
    .expect("valid opaque span regex")
});

/// Whether a referenced URL should be stored as a page or as a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkHint {
    Page,
    Resource,
}

/// Rewrites the link-bearing attribute values in `html`
///
/// An attribute is rewritten when a rule in `rules` matches its element and
/// names it; navigation rules give [`LinkHint::Page`], resource rules
/// [`LinkHint::Resource`]. `resolve` receives each reference as a normalized
/// absolute URL and returns the replacement (without fragment), or `None` to
/// leave the value untouched. Fragments on the original value are carried
/// over.
pub fn rewrite_links<F>(
    html: &str,
    base_url: &Url,
    rules: &ExtractionRules,
    mut resolve: F,
) -> String
where
    F: FnMut(&Url, LinkHint) -> Option<String>,
{
    let mut out = String::with_capacity(html.len());
    let mut last = 0;

    for span in RE_OPAQUE.captures_iter(html) {
        let Some(whole) = span.get(0) else {
            continue;
        };
        let between = &html[last..whole.start()];
        out.push_str(&rewrite_tags(between, base_url, rules, &mut resolve));

        match span.get(1).or_else(|| span.get(2)) {
            Some(open) => {
                out.push_str(&rewrite_tags(open.as_str(), base_url, rules, &mut resolve));
                out.push_str(&html[open.end()..whole.end()]);
            }
            None => out.push_str(whole.as_str()),
        }
        last = whole.end();
    }

    out.push_str(&rewrite_tags(&html[last..], base_url, rules, &mut resolve));
    out
}

fn rewrite_tags<F>(
    fragment: &str,
    base_url: &Url,
    rules: &ExtractionRules,
    resolve: &mut F,
) -> String
where
    F: FnMut(&Url, LinkHint) -> Option<String>,
{
    RE_TAG
        .replace_all(fragment, |tag: &Captures| {
            let whole = &tag[0];
            let Some(attrs) = tag.get(2) else {
                return whole.to_string();
            };

            let name = tag[1].to_ascii_lowercase();
            let rel = attr_value(attrs.as_str(), "rel");
            let matching: Vec<&LinkRule> = rules.rules_for(&name, rel.as_deref()).collect();
            if matching.is_empty() {
                return whole.to_string();
            }
            let download = attr_value(attrs.as_str(), "download").is_some();

            let rewritten = RE_ATTR.replace_all(attrs.as_str(), |attr: &Captures| {
                rewrite_attr(attr, base_url, &matching, download, resolve)
            });

            let start = attrs.start() - tag.get(0).map_or(0, |m| m.start());
            let end = start + attrs.as_str().len();
            format!("{}{}{}", &whole[..start], rewritten, &whole[end..])
        })
        .into_owned()
}

fn rewrite_attr<F>(
    attr: &Captures,
    base_url: &Url,
    matching: &[&LinkRule],
    download: bool,
    resolve: &mut F,
) -> String
where
    F: FnMut(&Url, LinkHint) -> Option<String>,
{
    let original = attr[0].to_string();

    let name = &attr[2];
    let Some(rule) = matching.iter().find(|r| r.attr.eq_ignore_ascii_case(name)) else {
        return original;
    };
    let hint = match rule.target {
        // Not followed by the frontier, so there is no local page to point at
        LinkTarget::Navigation if download => return original,
        LinkTarget::Navigation => LinkHint::Page,
        LinkTarget::Resource(_) => LinkHint::Resource,
    };
    let (Some(eq), Some(raw)) = (attr.get(3), attr.get(4)) else {
        return original;
    };

    let (quote, value) = unquote(raw.as_str());
    let decoded = value.replace("&amp;", "&");

    let Some(target) = resolve_reference(&decoded, base_url) else {
        return original;
    };
    let Some(mut replacement) = resolve(&target, hint) else {
        return original;
    };

    if let Some(idx) = decoded.find('#') {
        replacement.push_str(&decoded[idx..]);
    }

    let quote = quote.unwrap_or('"');
    format!(
        "{}{}{}{}{}{}",
        &attr[1],
        name,
        eq.as_str(),
        quote,
        replacement,
        quote
    )
}

fn unquote(raw: &str) -> (Option<char>, &str) {
    for q in ['"', '\''] {
        if raw.len() >= 2 && raw.starts_with(q) && raw.ends_with(q) {
            return (Some(q), &raw[1..raw.len() - 1]);
        }
    }
    (None, raw)
}

/// Value of attribute `name` in a raw attribute list; valueless attributes
/// yield an empty string
fn attr_value(attrs: &str, name: &str) -> Option<String> {
    RE_ATTR
        .captures_iter(attrs)
        .find(|c| c[2].eq_ignore_ascii_case(name))
        .map(|c| {
            c.get(4)
                .map(|v| unquote(v.as_str()).1.to_string())
                .unwrap_or_default()
        })
}
