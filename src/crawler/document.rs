//! Parsed markup abstraction
//!
//! Extraction only needs to walk elements and read visible text, so it is
//! written against these two traits rather than a concrete parser. The
//! production implementation wraps `scraper`; tests can supply a hand-built
//! document.

use scraper::{ElementRef, Html};

/// Elements whose text is never visible on the rendered page
const INVISIBLE_TEXT_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// A single element of a parsed document
pub trait MarkupElement {
    /// Lowercase tag name
    fn tag_name(&self) -> &str;

    /// Attribute value, if present
    fn attr(&self, name: &str) -> Option<&str>;

    /// Concatenated text of this element's descendants
    fn text(&self) -> String;
}

/// A parsed document that can be walked element by element
pub trait MarkupDocument {
    /// Calls `visitor` for every element in document order
    fn visit_elements(&self, visitor: &mut dyn FnMut(&dyn MarkupElement));

    /// Visible text of the whole document (script and style bodies excluded)
    fn text_content(&self) -> String;
}

/// HTML document parsed with `scraper`
pub struct HtmlDocument {
    html: Html,
}

impl HtmlDocument {
    /// Parses a full HTML document; malformed markup is recovered, never rejected
    pub fn parse(source: &str) -> Self {
        Self {
            html: Html::parse_document(source),
        }
    }
}

struct ScraperElement<'a>(ElementRef<'a>);

impl MarkupElement for ScraperElement<'_> {
    fn tag_name(&self) -> &str {
        self.0.value().name()
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.0.value().attr(name)
    }

    fn text(&self) -> String {
        self.0.text().collect::<String>()
    }
}

impl MarkupDocument for HtmlDocument {
    fn visit_elements(&self, visitor: &mut dyn FnMut(&dyn MarkupElement)) {
        for node in self.html.root_element().descendants() {
            if let Some(element) = ElementRef::wrap(node) {
                visitor(&ScraperElement(element));
            }
        }
    }

    fn text_content(&self) -> String {
        let mut out = String::new();

        for node in self.html.root_element().descendants() {
            let Some(text) = node.value().as_text() else {
                continue;
            };

            let hidden = node.ancestors().any(|ancestor| {
                ElementRef::wrap(ancestor)
                    .map(|e| INVISIBLE_TEXT_TAGS.contains(&e.value().name()))
                    .unwrap_or(false)
            });
            if hidden {
                continue;
            }

            out.push_str(text);
            out.push(' ');
        }

        out
    }
}
