//! Markdown converter - renders sanitized HTML as Markdown
//!
//! The converter walks the DOM depth-first in document order and writes
//! Markdown into a single output buffer. Each element type has a dedicated
//! handler; anything unrecognized is treated as a transparent container.
//!
//! # Element Handlers
//!
//! - **Headings (h1-h6)**: ATX style (`#` to `######`)
//! - **Paragraphs and sectioning containers**: blank line separated blocks
//! - **Links**: fragment-only targets and script/HTML data targets are
//!   unwrapped to their text; relative targets are resolved against the base
//!   URL; a `title` attribute becomes a quoted suffix
//! - **Images**: emitted only with non-empty alt text, relative sources resolved
//! - **Code**: fenced blocks with a language hint recovered from the code
//!   element's class (`language-X`, `lang-X`, `highlight-X`, `hljs X`)
//! - **Tables**: pipe tables, first row as header, `| --- |` separator
//! - **Lists, blockquotes, emphasis, strikethrough, rules and line breaks**
//!
//! # Render Rules
//!
//! Callers can register [`RenderRule`]s. Rules are checked in registration
//! order before any built-in handler; the first rule whose filter accepts a
//! node renders it from the node's already-rendered child content.
//!
//! # Output Normalization
//!
//! Outside fenced code, trailing whitespace is removed and runs of blank
//! lines collapse to a single blank line. The result is trimmed.
//!
//! # Examples
//!
//! ```rust
//! use agent_seo_core::converter::MarkdownConverter;
//!
//! let converter = MarkdownConverter::new().with_base_url(Some("https://example.com/docs/"));
//! let markdown = converter.convert_fragment("<h2>Setup</h2><p>See <a href=\"install\">install</a>.</p>");
//! assert_eq!(markdown, "## Setup\n\nSee [install](https://example.com/docs/install).");
//! ```

use std::fmt;
use std::sync::Arc;

use markup5ever_rcdom::{Handle, NodeData, RcDom};
use tracing::debug;
use url::Url;

use crate::dom;
use crate::parser::parse_document;

/// Nesting depth beyond which subtrees are flattened to plain text
pub const MAX_RENDER_DEPTH: usize = 512;

/// Elements rendered as blank-line separated blocks
const BLOCK_ELEMENTS: &[&str] = &[
    "address",
    "article",
    "aside",
    "details",
    "dialog",
    "dd",
    "div",
    "dl",
    "dt",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "form",
    "header",
    "li",
    "main",
    "nav",
    "p",
    "section",
    "summary",
];

/// Elements never rendered
const SKIPPED_ELEMENTS: &[&str] = &["head", "title", "script", "style", "noscript", "template"];

type RuleFilter = dyn Fn(&Handle) -> bool + Send + Sync;
type RuleReplacement = dyn Fn(&str, &Handle) -> String + Send + Sync;

/// Caller-supplied rendering rule
///
/// The replacement receives the rendered Markdown of the node's children and
/// the node itself.
///
/// # Examples
///
/// ```rust
/// use agent_seo_core::converter::{MarkdownConverter, RenderRule};
///
/// let highlight = RenderRule::for_tags("highlight", &["mark"], |content, _| format!("=={}==", content));
/// let converter = MarkdownConverter::new().with_rules(vec![highlight]);
/// assert_eq!(converter.convert_fragment("<p>a <mark>b</mark></p>"), "a ==b==");
/// ```
#[derive(Clone)]
pub struct RenderRule {
    name: String,
    filter: Arc<RuleFilter>,
    replacement: Arc<RuleReplacement>,
}

impl RenderRule {
    /// Create a rule from an arbitrary node predicate
    pub fn new<F, R>(name: impl Into<String>, filter: F, replacement: R) -> Self
    where
        F: Fn(&Handle) -> bool + Send + Sync + 'static,
        R: Fn(&str, &Handle) -> String + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            filter: Arc::new(filter),
            replacement: Arc::new(replacement),
        }
    }

    /// Create a rule matching elements by tag name
    pub fn for_tags<R>(name: impl Into<String>, tags: &[&str], replacement: R) -> Self
    where
        R: Fn(&str, &Handle) -> String + Send + Sync + 'static,
    {
        let tags: Vec<String> = tags.iter().map(|tag| tag.to_ascii_lowercase()).collect();
        Self::new(
            name,
            move |node: &Handle| {
                dom::element_name(node).is_some_and(|name| tags.iter().any(|tag| tag == name))
            },
            replacement,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn matches(&self, node: &Handle) -> bool {
        (self.filter)(node)
    }
}

impl fmt::Debug for RenderRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderRule").field("name", &self.name).finish()
    }
}

/// HTML to Markdown converter
#[derive(Debug, Clone, Default)]
pub struct MarkdownConverter {
    base_url: Option<Url>,
    rules: Vec<RenderRule>,
}

impl MarkdownConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative link and image targets against `base_url`
    ///
    /// An unparseable base URL leaves targets as written.
    pub fn with_base_url(mut self, base_url: Option<&str>) -> Self {
        self.base_url = base_url.and_then(|raw| match Url::parse(raw) {
            Ok(url) => Some(url),
            Err(err) => {
                debug!(base_url = raw, error = %err, "ignoring unparseable base URL");
                None
            }
        });
        self
    }

    /// Register rules, checked in order before the built-in handlers
    pub fn with_rules(mut self, rules: Vec<RenderRule>) -> Self {
        self.rules.extend(rules);
        self
    }

    pub fn add_rule(&mut self, rule: RenderRule) {
        self.rules.push(rule);
    }

    /// Convert an HTML fragment to Markdown
    pub fn convert_fragment(&self, html: &str) -> String {
        self.convert(&parse_document(html))
    }

    /// Convert a parsed document to Markdown
    ///
    /// Only the body is rendered; documents without a body render from the
    /// document root.
    pub fn convert(&self, dom: &RcDom) -> String {
        let root = dom::find_first(&dom.document, "body").unwrap_or_else(|| dom.document.clone());
        let mut output = String::new();
        self.traverse_children(&root, &mut output, 0);
        self.normalize_output(&output)
    }

    fn traverse_children(&self, node: &Handle, output: &mut String, depth: usize) {
        for child in node.children.borrow().iter() {
            self.traverse_node(child, output, depth + 1);
        }
    }

    fn traverse_node(&self, node: &Handle, output: &mut String, depth: usize) {
        if depth > MAX_RENDER_DEPTH {
            push_text(output, &dom::text_content(node));
            return;
        }

        match node.data {
            NodeData::Text { ref contents } => push_text(output, &contents.borrow()),
            NodeData::Element { ref name, .. } => {
                let tag = name.local.as_ref();
                if let Some(rule) = self.rules.iter().find(|rule| rule.matches(node)) {
                    let mut content = String::new();
                    self.traverse_children(node, &mut content, depth);
                    output.push_str(&(rule.replacement)(&content, node));
                    return;
                }
                self.handle_element(node, tag, output, depth);
            }
            NodeData::Document => self.traverse_children(node, output, depth),
            _ => {}
        }
    }

    fn handle_element(&self, node: &Handle, tag: &str, output: &mut String, depth: usize) {
        match tag {
            "h1" => self.handle_heading(node, 1, output, depth),
            "h2" => self.handle_heading(node, 2, output, depth),
            "h3" => self.handle_heading(node, 3, output, depth),
            "h4" => self.handle_heading(node, 4, output, depth),
            "h5" => self.handle_heading(node, 5, output, depth),
            "h6" => self.handle_heading(node, 6, output, depth),

            "a" => self.handle_link(node, output, depth),
            "img" => self.handle_image(node, output),

            "ul" => self.handle_list(node, output, depth, false),
            "ol" => self.handle_list(node, output, depth, true),

            "pre" => self.handle_code_block(node, output),
            "code" | "kbd" | "samp" => self.handle_inline_code(node, output),

            "strong" | "b" => self.handle_emphasis(node, "**", output, depth),
            "em" | "i" => self.handle_emphasis(node, "*", output, depth),
            "del" | "s" | "strike" => self.handle_emphasis(node, "~~", output, depth),

            "blockquote" => self.handle_blockquote(node, output, depth),
            "table" => self.handle_table(node, output, depth),

            "br" => output.push('\n'),
            "hr" => {
                ensure_blank_line(output);
                output.push_str("---\n\n");
            }

            _ if SKIPPED_ELEMENTS.contains(&tag) => {}

            _ if BLOCK_ELEMENTS.contains(&tag) => {
                ensure_blank_line(output);
                self.traverse_children(node, output, depth);
                ensure_blank_line(output);
            }

            _ => self.traverse_children(node, output, depth),
        }
    }

    fn handle_heading(&self, node: &Handle, level: usize, output: &mut String, depth: usize) {
        let mut content = String::new();
        self.traverse_children(node, &mut content, depth);
        let text = collapse_whitespace(&content);
        if text.is_empty() {
            return;
        }

        ensure_blank_line(output);
        output.push_str(&"#".repeat(level));
        output.push(' ');
        output.push_str(&text);
        output.push_str("\n\n");
    }

    fn handle_link(&self, node: &Handle, output: &mut String, depth: usize) {
        let mut content = String::new();
        self.traverse_children(node, &mut content, depth);

        let href = dom::get_attr(node, "href").map(|href| href.trim().to_string());
        let Some(href) = href.filter(|href| !href.is_empty()) else {
            push_inline(output, &content);
            return;
        };

        let text = collapse_whitespace(&content);
        if text.is_empty() || href.starts_with('#') || is_unsafe_target(&href) {
            push_inline(output, &content);
            return;
        }

        let target = self.resolve_url(&href);
        let markdown = match dom::get_attr(node, "title").filter(|t| !t.trim().is_empty()) {
            Some(title) => format!("[{}]({} \"{}\")", text, target, title.replace('"', "\\\"")),
            None => format!("[{}]({})", text, target),
        };
        push_wrapped(output, &content, &markdown);
    }

    fn handle_image(&self, node: &Handle, output: &mut String) {
        let alt = dom::get_attr(node, "alt").map(|alt| collapse_whitespace(&alt));
        let src = dom::get_attr(node, "src").map(|src| src.trim().to_string());

        if let (Some(alt), Some(src)) = (alt, src)
            && !alt.is_empty()
            && !src.is_empty()
        {
            output.push_str(&format!("![{}]({})", alt, self.resolve_url(&src)));
        }
    }

    fn handle_list(&self, node: &Handle, output: &mut String, depth: usize, ordered: bool) {
        let mut index: u64 = if ordered {
            dom::get_attr(node, "start")
                .and_then(|start| start.trim().parse().ok())
                .unwrap_or(1)
        } else {
            1
        };

        ensure_blank_line(output);
        for child in node.children.borrow().iter() {
            if !dom::is_element(child, "li") {
                if let NodeData::Element { .. } = child.data {
                    self.traverse_node(child, output, depth + 1);
                }
                continue;
            }

            let mut item = String::new();
            self.traverse_children(child, &mut item, depth + 1);
            let lines = item_lines(&item);
            if lines.is_empty() {
                continue;
            }

            let marker = if ordered {
                format!("{}. ", index)
            } else {
                "- ".to_string()
            };
            index += 1;

            let indent = " ".repeat(marker.len());
            for (position, line) in lines.iter().enumerate() {
                if position == 0 {
                    output.push_str(&marker);
                    output.push_str(line.trim_start());
                } else if !line.is_empty() {
                    output.push_str(&indent);
                    output.push_str(line);
                }
                output.push('\n');
            }
        }
        output.push('\n');
    }

    fn handle_code_block(&self, node: &Handle, output: &mut String) {
        let code_element = node
            .children
            .borrow()
            .iter()
            .find(|child| dom::is_element(child, "code"))
            .cloned();

        let language = code_element
            .as_ref()
            .and_then(|code| dom::get_attr(code, "class"))
            .and_then(|class| detect_language(&class));
        let source = code_element.as_ref().unwrap_or(node);
        let code = dom::text_content(source);
        let code = code.trim_end_matches(['\n', '\r']);

        let fence = "`".repeat(longest_backtick_run(code).max(2) + 1);

        ensure_blank_line(output);
        output.push_str(&fence);
        if let Some(language) = language {
            output.push_str(&language);
        }
        output.push('\n');
        output.push_str(code);
        output.push('\n');
        output.push_str(&fence);
        output.push_str("\n\n");
    }

    fn handle_inline_code(&self, node: &Handle, output: &mut String) {
        let code = dom::text_content(node).replace(['\n', '\r'], " ");
        if code.trim().is_empty() {
            return;
        }

        let fence = "`".repeat(longest_backtick_run(&code) + 1);
        let padding = if code.starts_with('`') || code.ends_with('`') {
            " "
        } else {
            ""
        };
        output.push_str(&format!("{fence}{padding}{code}{padding}{fence}"));
    }

    fn handle_emphasis(&self, node: &Handle, marker: &str, output: &mut String, depth: usize) {
        let mut content = String::new();
        self.traverse_children(node, &mut content, depth);
        let text = content.trim();
        if text.is_empty() {
            push_inline(output, &content);
            return;
        }
        push_wrapped(output, &content, &format!("{marker}{text}{marker}"));
    }

    fn handle_blockquote(&self, node: &Handle, output: &mut String, depth: usize) {
        let mut content = String::new();
        self.traverse_children(node, &mut content, depth);
        let content = self.normalize_output(&content);
        if content.is_empty() {
            return;
        }

        ensure_blank_line(output);
        for line in content.lines() {
            if line.is_empty() {
                output.push_str(">\n");
            } else {
                output.push_str("> ");
                output.push_str(line);
                output.push('\n');
            }
        }
        output.push('\n');
    }

    fn handle_table(&self, node: &Handle, output: &mut String, depth: usize) {
        let mut caption = None;
        let mut rows: Vec<Vec<String>> = Vec::new();

        for child in node.children.borrow().iter() {
            match dom::element_name(child) {
                Some("caption") => {
                    let mut text = String::new();
                    self.traverse_children(child, &mut text, depth);
                    caption = Some(collapse_whitespace(&text));
                }
                Some("thead") | Some("tbody") | Some("tfoot") => {
                    for row in child.children.borrow().iter() {
                        if dom::is_element(row, "tr") {
                            rows.push(self.extract_table_row(row, depth));
                        }
                    }
                }
                Some("tr") => rows.push(self.extract_table_row(child, depth)),
                _ => {}
            }
        }

        rows.retain(|row| !row.is_empty());
        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        if columns == 0 {
            return;
        }

        ensure_blank_line(output);
        if let Some(caption) = caption.filter(|c| !c.is_empty()) {
            output.push_str(&caption);
            output.push_str("\n\n");
        }
        self.write_gfm_table(output, &rows, columns);
        output.push('\n');
    }

    fn extract_table_row(&self, row: &Handle, depth: usize) -> Vec<String> {
        row.children
            .borrow()
            .iter()
            .filter(|cell| dom::is_element(cell, "td") || dom::is_element(cell, "th"))
            .map(|cell| {
                let mut content = String::new();
                self.traverse_children(cell, &mut content, depth + 1);
                collapse_whitespace(&content).replace('|', "\\|")
            })
            .collect()
    }

    fn write_gfm_table(&self, output: &mut String, rows: &[Vec<String>], columns: usize) {
        let write_row = |output: &mut String, row: &[String]| {
            output.push('|');
            for column in 0..columns {
                match row.get(column).filter(|cell| !cell.is_empty()) {
                    Some(cell) => {
                        output.push(' ');
                        output.push_str(cell);
                        output.push_str(" |");
                    }
                    None => output.push_str("  |"),
                }
            }
            output.push('\n');
        };

        let (header, body) = rows.split_at(1);
        write_row(output, &header[0]);

        output.push('|');
        for _ in 0..columns {
            output.push_str(" --- |");
        }
        output.push('\n');

        for row in body {
            write_row(output, row);
        }
    }

    fn resolve_url(&self, target: &str) -> String {
        if Url::parse(target).is_ok() {
            return target.to_string();
        }
        match &self.base_url {
            Some(base) => base
                .join(target)
                .map(|url| url.to_string())
                .unwrap_or_else(|_| target.to_string()),
            None => target.to_string(),
        }
    }

    /// Normalize rendered output
    ///
    /// Removes trailing whitespace and collapses blank-line runs, both only
    /// outside fenced code, then trims the result.
    fn normalize_output(&self, output: &str) -> String {
        let mut result = String::with_capacity(output.len());
        let mut fence: Option<String> = None;
        let mut previous_blank = false;

        for raw in output.split('\n') {
            let in_fence = fence.is_some();
            let line = match &fence {
                Some(open) => {
                    if raw.trim() == open {
                        fence = None;
                        raw.trim()
                    } else {
                        raw
                    }
                }
                None => {
                    let line = raw.trim_end();
                    fence = opening_fence(line);
                    line
                }
            };

            if line.is_empty() && !in_fence {
                if previous_blank {
                    continue;
                }
                previous_blank = true;
            } else {
                previous_blank = false;
            }
            result.push_str(line);
            result.push('\n');
        }

        result.trim().to_string()
    }
}

/// Convert an HTML fragment with an optional base URL
pub fn render_markdown(html: &str, base_url: Option<&str>) -> String {
    MarkdownConverter::new()
        .with_base_url(base_url)
        .convert_fragment(html)
}

/// Language hint from a code element's class list
fn detect_language(class: &str) -> Option<String> {
    let tokens: Vec<&str> = class.split_whitespace().collect();
    let valid = |lang: &str| {
        !lang.is_empty()
            && lang
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '-'))
    };

    let prefixed = tokens.iter().find_map(|token| {
        ["language-", "lang-", "highlight-"]
            .iter()
            .find_map(|prefix| token.strip_prefix(prefix))
            .filter(|lang| valid(lang))
    });
    if let Some(lang) = prefixed {
        return Some(lang.to_string());
    }

    tokens
        .windows(2)
        .find(|pair| pair[0] == "hljs" && valid(pair[1]))
        .map(|pair| pair[1].to_string())
}

fn is_unsafe_target(href: &str) -> bool {
    let lower = href.to_ascii_lowercase();
    lower.starts_with("javascript:") || lower.starts_with("data:text/html")
}

fn fence_marker(line: &str) -> Option<String> {
    let ticks = line.chars().take_while(|c| *c == '`').count();
    (ticks >= 3).then(|| "`".repeat(ticks))
}

/// Fence opened by a line, looking past one leading list marker
fn opening_fence(line: &str) -> Option<String> {
    let line = line.trim_start();
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    let content = line
        .strip_prefix("- ")
        .or_else(|| (digits > 0).then(|| line[digits..].strip_prefix(". ")).flatten())
        .unwrap_or(line);
    fence_marker(content)
}

/// Lines of a rendered list item with blank lines dropped, except inside
/// fenced code where they are content
fn item_lines(item: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut fence: Option<String> = None;

    for raw in item.lines() {
        match &fence {
            Some(open) => {
                if raw.trim() == open {
                    fence = None;
                    lines.push(raw.trim_end());
                } else if raw.trim().is_empty() {
                    lines.push("");
                } else {
                    lines.push(raw);
                }
            }
            None => {
                let line = raw.trim_end();
                if line.is_empty() {
                    continue;
                }
                fence = fence_marker(line.trim_start());
                lines.push(line);
            }
        }
    }

    lines
}

fn longest_backtick_run(text: &str) -> usize {
    text.split(|c| c != '`').map(str::len).max().unwrap_or(0)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Push text with whitespace runs collapsed to single spaces
///
/// Leading whitespace is dropped when the output already ends in whitespace.
fn push_text(output: &mut String, text: &str) {
    let mut collapsed = String::with_capacity(text.len());
    let mut pending_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            pending_space = true;
        } else {
            if pending_space {
                collapsed.push(' ');
                pending_space = false;
            }
            collapsed.push(ch);
        }
    }
    if pending_space {
        collapsed.push(' ');
    }

    if output.ends_with(char::is_whitespace) {
        output.push_str(collapsed.trim_start());
    } else {
        output.push_str(&collapsed);
    }
}

/// Push already rendered inline content
fn push_inline(output: &mut String, content: &str) {
    if output.ends_with(char::is_whitespace) {
        output.push_str(content.trim_start());
    } else {
        output.push_str(content);
    }
}

/// Push a Markdown construct, keeping the whitespace that surrounded its
/// source content outside the markers
fn push_wrapped(output: &mut String, content: &str, markdown: &str) {
    if content.starts_with(char::is_whitespace)
        && !output.is_empty()
        && !output.ends_with(char::is_whitespace)
    {
        output.push(' ');
    }
    output.push_str(markdown);
    if content.ends_with(char::is_whitespace) {
        output.push(' ');
    }
}

/// Ensure the output ends with a blank line unless it is empty
fn ensure_blank_line(output: &mut String) {
    if output.is_empty() || output.ends_with("\n\n") {
        return;
    }
    if output.ends_with('\n') {
        output.push('\n');
    } else {
        output.push_str("\n\n");
    }
}
