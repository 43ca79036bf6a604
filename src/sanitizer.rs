//! Noise removal for extracted content
//!
//! The sanitizer targets readability, not security: it strips page chrome,
//! embeds, ads, consent banners and similar clutter so the rendered text
//! carries only the content an agent needs.
//!
//! # Passes
//!
//! 1. Resolve preserve-selectors. Matched nodes and their ancestors are
//!    protected from every later pass.
//! 2. Remove non-content tags (scripts, styles, embeds, media, metadata).
//! 3. Remove the noise taxonomy (navigation, landmarks, ads, cookie banners,
//!    popups, social widgets, comments, forms, related/sidebar blocks,
//!    newsletter prompts, breadcrumbs, hidden nodes) plus caller selectors.
//! 4. Remove low text density containers.
//! 5. Remove containers left without text or embedded content.
//! 6. Reduce attributes to a whitelist.
//!
//! Every pass works on one `scraper` fragment tree; pass 6 happens while
//! that tree is serialized, with attributes written in name order.
//!
//! # Examples
//!
//! ```rust
//! use agent_seo_core::sanitizer::sanitize;
//!
//! let cleaned = sanitize("<nav>Menu</nav><p class=\"lead\">Body</p>");
//! assert_eq!(cleaned, "<p>Body</p>");
//! ```

use std::collections::HashSet;
use std::sync::LazyLock;

use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Non-content tags removed outright
const STRIP_TAGS: &[&str] = &[
    "script",
    "style",
    "noscript",
    "iframe",
    "svg",
    "canvas",
    "video",
    "audio",
    "map",
    "object",
    "embed",
    "applet",
    r#"link[rel="stylesheet"]"#,
    "meta",
];

/// Page chrome that is kept when it belongs to an article
const CHROME_OUTSIDE_ARTICLE: &[&str] = &["header", "footer"];

/// Noise taxonomy
const NOISE_SELECTORS: &[&str] = &[
    // Navigation and landmarks
    "nav",
    r#"[role="navigation"]"#,
    r#"[role="banner"]"#,
    r#"[role="contentinfo"]"#,
    r#"[role="complementary"]"#,
    "aside",
    // Ads
    ".advertisement",
    ".ad",
    ".ads",
    r#"[class*="ad-"]"#,
    r#"[class*="ad_"]"#,
    // Cookie and consent banners
    ".cookie-banner",
    ".cookie-consent",
    r#"[class*="cookie"]"#,
    // Popups and modals
    ".popup",
    ".modal",
    r#"[class*="popup"]"#,
    r#"[class*="modal"]"#,
    ".overlay",
    // Social
    ".social-share",
    ".share-buttons",
    r#"[class*="social"]"#,
    r#"[class*="share"]"#,
    ".follow-us",
    // Comments and forms
    ".comments",
    "#comments",
    ".comment-form",
    r#"form:not([class*="search"])"#,
    // Related content, sidebars, widgets
    ".related-posts",
    ".recommended",
    ".sidebar",
    ".widget",
    r#"[class*="related"]"#,
    r#"[class*="sidebar"]"#,
    r#"[class*="widget"]"#,
    // Newsletter and calls to action
    ".newsletter",
    ".subscribe",
    r#"[class*="newsletter"]"#,
    ".cta",
    r#"[class*="cta"]"#,
    // Breadcrumbs, pagination, hidden nodes
    ".breadcrumb",
    ".breadcrumbs",
    ".pagination",
    ".skip-link",
    r#"[aria-hidden="true"]"#,
    // Framework hydration artifacts
    "[data-reactroot] > noscript",
    ".hydration-overlay",
];

/// Attributes that survive sanitization
const ALLOWED_ATTRIBUTES: &[&str] = &[
    "href", "src", "alt", "title", "colspan", "rowspan", "scope", "headers", "lang", "dir", "type",
];

struct StripRule {
    selector: Selector,
    outside_article_only: bool,
}

static DEFAULT_STRIP_RULES: LazyLock<Vec<StripRule>> = LazyLock::new(|| {
    let plain = STRIP_TAGS
        .iter()
        .chain(NOISE_SELECTORS)
        .filter_map(|source| compile(source))
        .map(|selector| StripRule {
            selector,
            outside_article_only: false,
        });
    let chrome = CHROME_OUTSIDE_ARTICLE
        .iter()
        .filter_map(|source| compile(source))
        .map(|selector| StripRule {
            selector,
            outside_article_only: true,
        });
    plain.chain(chrome).collect()
});

static CONTAINER_SELECTOR: LazyLock<Option<Selector>> =
    LazyLock::new(|| compile("div, section, span"));

static EMPTY_CANDIDATE_SELECTOR: LazyLock<Option<Selector>> =
    LazyLock::new(|| compile("div, span, p, section, article"));

static EMBEDDED_CONTENT_SELECTOR: LazyLock<Option<Selector>> =
    LazyLock::new(|| compile("img, table, pre, code"));

fn compile(source: &str) -> Option<Selector> {
    match Selector::parse(source) {
        Ok(selector) => Some(selector),
        Err(err) => {
            debug!(selector = source, error = ?err, "skipping invalid selector");
            None
        }
    }
}

/// Low text density thresholds
///
/// A `div`, `section` or `span` with more than `max_descendants` descendant
/// elements and fewer than `min_text_chars` characters of trimmed text is
/// treated as link-farm or widget markup and removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DensityThresholds {
    pub max_descendants: usize,
    pub min_text_chars: usize,
}

impl Default for DensityThresholds {
    fn default() -> Self {
        Self {
            max_descendants: 10,
            min_text_chars: 50,
        }
    }
}

/// Sanitizer configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SanitizeOptions {
    /// Extra CSS selectors to remove, on top of the default taxonomy
    pub strip_selectors: Vec<String>,
    /// CSS selectors whose matches are never removed
    pub preserve_selectors: Vec<String>,
    /// Low density thresholds
    pub density: DensityThresholds,
}

/// Compiled sanitizer
///
/// Invalid caller selectors are dropped at construction with a debug log.
pub struct Sanitizer {
    extra_strip: Vec<StripRule>,
    preserve: Vec<Selector>,
    density: DensityThresholds,
}

impl Sanitizer {
    pub fn new(options: &SanitizeOptions) -> Self {
        Self {
            extra_strip: options
                .strip_selectors
                .iter()
                .filter_map(|source| compile(source))
                .map(|selector| StripRule {
                    selector,
                    outside_article_only: false,
                })
                .collect(),
            preserve: options
                .preserve_selectors
                .iter()
                .filter_map(|source| compile(source))
                .collect(),
            density: options.density,
        }
    }

    /// Sanitize an HTML fragment and return the cleaned fragment
    pub fn sanitize(&self, html: &str) -> String {
        let mut document = Html::parse_fragment(html);

        // Preserved nodes and their ancestors
        let mut protected = HashSet::new();
        for selector in &self.preserve {
            for element in document.root_element().select(selector) {
                protected.insert(element.id());
                protected.extend(element.ancestors().map(|node| node.id()));
            }
        }

        let mut doomed = Vec::new();
        for rule in DEFAULT_STRIP_RULES.iter().chain(&self.extra_strip) {
            for element in document.root_element().select(&rule.selector) {
                if protected.contains(&element.id()) {
                    continue;
                }
                if rule.outside_article_only && within_article(element) {
                    continue;
                }
                doomed.push(element.id());
            }
        }
        let stripped = doomed.len();
        for id in doomed {
            if let Some(mut node) = document.tree.get_mut(id) {
                node.detach();
            }
        }

        let mut low_density = 0;
        if let Some(selector) = CONTAINER_SELECTOR.as_ref() {
            let candidates: Vec<_> = document
                .root_element()
                .select(selector)
                .map(|element| element.id())
                .collect();
            for id in candidates {
                let remove = !protected.contains(&id)
                    && document
                        .tree
                        .get(id)
                        .and_then(ElementRef::wrap)
                        .is_some_and(|element| self.is_low_density(element));
                if remove && let Some(mut node) = document.tree.get_mut(id) {
                    node.detach();
                    low_density += 1;
                }
            }
        }

        let mut empty = 0;
        if let Some(selector) = EMPTY_CANDIDATE_SELECTOR.as_ref() {
            let candidates: Vec<_> = document
                .root_element()
                .select(selector)
                .map(|element| element.id())
                .collect();
            for id in candidates {
                let remove = !protected.contains(&id)
                    && document
                        .tree
                        .get(id)
                        .and_then(ElementRef::wrap)
                        .is_some_and(is_empty_container);
                if remove && let Some(mut node) = document.tree.get_mut(id) {
                    node.detach();
                    empty += 1;
                }
            }
        }

        debug!(stripped, low_density, empty, "sanitized fragment");

        let mut output = String::with_capacity(html.len());
        write_children(document.root_element(), &mut output);
        output
    }

    fn is_low_density(&self, element: ElementRef<'_>) -> bool {
        let descendants = element
            .descendants()
            .filter(|node| node.value().is_element())
            .count()
            .saturating_sub(1);
        if descendants <= self.density.max_descendants {
            return false;
        }
        let text: String = element.text().collect();
        text.trim().chars().count() < self.density.min_text_chars
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new(&SanitizeOptions::default())
    }
}

/// Sanitize a fragment with default options
pub fn sanitize(html: &str) -> String {
    Sanitizer::default().sanitize(html)
}

/// Sanitize a fragment with caller options
pub fn sanitize_with(html: &str, options: &SanitizeOptions) -> String {
    Sanitizer::new(options).sanitize(html)
}

fn within_article(element: ElementRef<'_>) -> bool {
    element.ancestors().any(|node| {
        node.value()
            .as_element()
            .is_some_and(|parent| parent.name() == "article")
    })
}

fn is_empty_container(element: ElementRef<'_>) -> bool {
    if !element.text().all(|text| text.trim().is_empty()) {
        return false;
    }
    match EMBEDDED_CONTENT_SELECTOR.as_ref() {
        Some(selector) => element.select(selector).next().is_none(),
        None => true,
    }
}

/// Elements serialized without a closing tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Serialize the children of `element`, dropping every attribute outside
/// the whitelist; `class` survives on `code` so the renderer can recover
/// language hints
fn write_children(element: ElementRef<'_>, output: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => escape_into(text, false, output),
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    write_element(child, output);
                }
            }
            _ => {}
        }
    }
}

fn write_element(element: ElementRef<'_>, output: &mut String) {
    let name = element.value().name();
    let keep_class = name == "code";

    output.push('<');
    output.push_str(name);
    let mut attrs: Vec<(&str, &str)> = element
        .value()
        .attrs()
        .filter(|(attr, _)| ALLOWED_ATTRIBUTES.contains(attr) || (keep_class && *attr == "class"))
        .collect();
    // Attribute storage order is unspecified
    attrs.sort_unstable_by_key(|(attr, _)| *attr);
    for (attr, value) in attrs {
        output.push(' ');
        output.push_str(attr);
        output.push_str("=\"");
        escape_into(value, true, output);
        output.push('"');
    }
    output.push('>');

    if VOID_ELEMENTS.contains(&name) {
        return;
    }
    // The parser eats one newline right after these start tags
    if matches!(name, "pre" | "textarea" | "listing")
        && let Some(Node::Text(text)) = element.first_child().map(|child| child.value())
        && text.starts_with('\n')
    {
        output.push('\n');
    }
    write_children(element, output);
    output.push_str("</");
    output.push_str(name);
    output.push('>');
}

fn escape_into(text: &str, in_attribute: bool, output: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => output.push_str("&amp;"),
            '\u{a0}' => output.push_str("&nbsp;"),
            '"' if in_attribute => output.push_str("&quot;"),
            '<' if !in_attribute => output.push_str("&lt;"),
            '>' if !in_attribute => output.push_str("&gt;"),
            _ => output.push(ch),
        }
    }
}
