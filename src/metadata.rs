//! Page metadata extraction
//!
//! Metadata is read from the raw document tree before any sanitization
//! touches it:
//!
//! - Title: `<title>` text, else the first `<h1>` text, else empty
//! - Description: `<meta name="description">`
//! - Canonical URL: `<link rel="canonical">`
//! - Language: the `lang` attribute of the root `<html>` element
//! - Last modified: `<meta property="article:modified_time">`, else
//!   `<meta name="last-modified">`
//!
//! # Examples
//!
//! ```rust
//! use agent_seo_core::metadata::MetadataExtractor;
//! use agent_seo_core::parser::parse_document;
//!
//! let dom = parse_document("<html lang=\"en\"><head><title>Example</title></head></html>");
//! let metadata = MetadataExtractor::new().extract(&dom);
//!
//! assert_eq!(metadata.title, "Example");
//! assert_eq!(metadata.lang.as_deref(), Some("en"));
//! ```

use markup5ever_rcdom::{Handle, NodeData, RcDom};
use std::cell::Ref;

use crate::dom;

/// Page metadata extracted from HTML
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PageMetadata {
    /// Page title, empty when the page has none
    pub title: String,
    /// Meta description, empty when absent
    pub description: String,
    /// Canonical URL as written in the document
    pub canonical_url: Option<String>,
    /// Root element language
    pub lang: Option<String>,
    /// Last modification timestamp as written in the document
    pub last_modified: Option<String>,
}

/// Metadata extractor
///
/// Meta fields keep the first non-empty value in document order. The
/// article modification time takes precedence over a generic
/// `last-modified` meta field regardless of which appears first.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetadataExtractor;

#[derive(Default)]
struct MetaFields {
    description: Option<String>,
    modified_time: Option<String>,
    last_modified: Option<String>,
}

impl MetadataExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract metadata from a parsed document
    ///
    /// Never fails: missing fields come back empty or `None`.
    pub fn extract(&self, dom: &RcDom) -> PageMetadata {
        let mut fields = MetaFields::default();
        self.traverse_for_meta(&dom.document, &mut fields);

        PageMetadata {
            title: self.find_title(dom),
            description: fields.description.unwrap_or_default(),
            canonical_url: self.find_canonical(dom),
            lang: self.find_lang(dom),
            last_modified: fields.modified_time.or(fields.last_modified),
        }
    }

    /// Title from `<title>`, falling back to the first `<h1>`
    fn find_title(&self, dom: &RcDom) -> String {
        ["title", "h1"]
            .into_iter()
            .filter_map(|tag| dom::find_first(&dom.document, tag))
            .map(|node| collapse_whitespace(&dom::text_content(&node)))
            .find(|text| !text.is_empty())
            .unwrap_or_default()
    }

    /// Canonical URL from `<link rel="canonical">`
    fn find_canonical(&self, dom: &RcDom) -> Option<String> {
        dom::find_all(&dom.document, "link")
            .into_iter()
            .filter(|link| {
                dom::get_attr(link, "rel").is_some_and(|rel| {
                    rel.split_ascii_whitespace()
                        .any(|token| token.eq_ignore_ascii_case("canonical"))
                })
            })
            .find_map(|link| non_empty(dom::get_attr(&link, "href")))
    }

    /// `lang` attribute of the `<html>` element
    fn find_lang(&self, dom: &RcDom) -> Option<String> {
        dom::find_first(&dom.document, "html").and_then(|html| non_empty(dom::get_attr(&html, "lang")))
    }

    /// Traverse DOM tree looking for meta tags
    fn traverse_for_meta(&self, node: &Handle, fields: &mut MetaFields) {
        let mut stack = vec![node.clone()];

        while let Some(current) = stack.pop() {
            if let NodeData::Element {
                ref name,
                ref attrs,
                ..
            } = current.data
                && name.local.as_ref() == "meta"
            {
                self.process_meta_tag(&attrs.borrow(), fields);
            }
            stack.extend(current.children.borrow().iter().rev().cloned());
        }
    }

    /// Process a single meta tag
    fn process_meta_tag(&self, attrs: &Ref<Vec<html5ever::Attribute>>, fields: &mut MetaFields) {
        let Some(content) = non_empty(self.get_attr(attrs, "content")) else {
            return;
        };

        let property = self.get_attr(attrs, "property");
        let name = self.get_attr(attrs, "name");

        if property.as_deref() == Some("article:modified_time") {
            fields.modified_time.get_or_insert(content);
            return;
        }

        match name.map(|n| n.to_ascii_lowercase()).as_deref() {
            Some("description") => {
                fields.description.get_or_insert(content);
            }
            Some("last-modified") => {
                fields.last_modified.get_or_insert(content);
            }
            _ => {}
        }
    }

    /// Get attribute value from element
    fn get_attr(&self, attrs: &Ref<Vec<html5ever::Attribute>>, name: &str) -> Option<String> {
        attrs
            .iter()
            .find(|attr| attr.name.local.as_ref() == name)
            .map(|attr| attr.value.to_string())
    }
}

/// Extract metadata with the default extractor
pub fn extract_metadata(dom: &RcDom) -> PageMetadata {
    MetadataExtractor::new().extract(dom)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_document;

    fn extract(html: &str) -> PageMetadata {
        extract_metadata(&parse_document(html))
    }

    #[test]
    fn test_title_from_title_tag() {
        let metadata = extract("<html><head><title> Test  Page </title></head><body><h1>H</h1></body></html>");
        assert_eq!(metadata.title, "Test Page");
    }

    #[test]
    fn test_title_falls_back_to_h1() {
        let metadata = extract("<html><head><title>   </title></head><body><h1>Heading <em>One</em></h1><h1>Two</h1></body></html>");
        assert_eq!(metadata.title, "Heading One");
    }

    #[test]
    fn test_title_empty_when_missing() {
        assert_eq!(extract("<p>no title</p>").title, "");
        assert_eq!(extract("").title, "");
    }

    #[test]
    fn test_description() {
        let metadata = extract(
            r#"<head><meta property="og:description" content="og"><meta name="description" content=" A test description "></head>"#,
        );
        assert_eq!(metadata.description, "A test description");
    }

    #[test]
    fn test_canonical_and_lang() {
        let metadata = extract(
            r#"<html lang="de"><head><link rel="stylesheet" href="/s.css"><link rel="canonical" href="https://example.com/page"></head></html>"#,
        );
        assert_eq!(metadata.canonical_url.as_deref(), Some("https://example.com/page"));
        assert_eq!(metadata.lang.as_deref(), Some("de"));
    }

    #[test]
    fn test_missing_optional_fields_are_none() {
        let metadata = extract("<html><body><p>x</p></body></html>");
        assert_eq!(metadata.canonical_url, None);
        assert_eq!(metadata.lang, None);
        assert_eq!(metadata.last_modified, None);
        assert_eq!(metadata.description, "");
    }

    #[test]
    fn test_last_modified_prefers_article_time() {
        let metadata = extract(
            r#"<head><meta name="last-modified" content="2023-01-01"><meta property="article:modified_time" content="2024-06-01T10:00:00Z"></head>"#,
        );
        assert_eq!(metadata.last_modified.as_deref(), Some("2024-06-01T10:00:00Z"));

        let metadata = extract(r#"<head><meta name="last-modified" content="2023-01-01"></head>"#);
        assert_eq!(metadata.last_modified.as_deref(), Some("2023-01-01"));
    }

    #[test]
    fn test_meta_without_content_is_ignored() {
        let metadata = extract(
            r#"<head><meta name="description"><meta name="description" content="second"></head>"#,
        );
        assert_eq!(metadata.description, "second");
    }
}
