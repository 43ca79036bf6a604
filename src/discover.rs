//! Route discovery from page file trees
//!
//! Two scanners derive manifest routes without executing any code:
//!
//! - [`discover_app_routes`] walks an app-router style directory where each
//!   route directory holds a `page.*` file. Directory nesting gives the URL
//!   path; parenthesized group directories do not contribute a segment;
//!   catch-all segments (`[...slug]`, `[[...slug]]`) are skipped. Titles and
//!   descriptions come from the page's `export const metadata = { ... }`
//!   literal when present.
//! - [`discover_html_routes`] walks a static build output of `.html` files.
//!
//! Results are sorted with `/` first, then by path.

use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::debug;

use crate::error::Result;
use crate::headers::{FULL_PATH, SUMMARY_PATH};
use crate::manifest::ManifestRoute;

/// File names recognised as route pages
pub const PAGE_FILES: &[&str] = &[
    "page.tsx", "page.ts", "page.jsx", "page.js", "page.mdx", "page.md",
];

/// Directories never scanned for pages
const SKIP_DIRS: &[&str] = &[
    "node_modules",
    ".next",
    ".git",
    "dist",
    ".turbo",
    "components",
    "lib",
    "utils",
    "hooks",
    "actions",
    "api",
];

/// Directories never scanned for HTML output
const SKIP_OUTPUT_DIRS: &[&str] = &["node_modules", ".next", ".git", "dist", ".turbo"];

static METADATA_EXPORT: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"export\s+const\s+metadata[\s:]*(?:Metadata\s*)?=\s*\{").ok()
});

static TITLE_FIELD: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r#"title\s*:\s*(?:'([^']*)'|"([^"]*)"|`([^`]*)`)"#).ok()
});

static DESCRIPTION_FIELD: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r#"description\s*:\s*(?:'([^']*)'|"([^"]*)"|`([^`]*)`)"#).ok()
});

static HTML_TITLE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)<title[^>]*>([^<]+)</title>").ok());

/// How a route's section is derived from its path
#[derive(Clone, Default)]
pub enum SectionStrategy {
    /// First path segment, humanized; the default section for `/` and for
    /// dynamic first segments
    #[default]
    Directory,
    /// Every route goes to the default section
    Flat,
    /// Caller supplied mapping from path to section
    Custom(Arc<dyn Fn(&str) -> String + Send + Sync>),
}

impl fmt::Debug for SectionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SectionStrategy::Directory => f.write_str("Directory"),
            SectionStrategy::Flat => f.write_str("Flat"),
            SectionStrategy::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Discovery options
#[derive(Debug, Clone)]
pub struct DiscoverOptions {
    /// Exclusion patterns, see [`should_exclude`]
    pub exclude: Vec<String>,
    pub section_strategy: SectionStrategy,
    pub default_section: String,
}

impl Default for DiscoverOptions {
    fn default() -> Self {
        Self {
            exclude: vec!["/api".to_string()],
            section_strategy: SectionStrategy::Directory,
            default_section: "Pages".to_string(),
        }
    }
}

impl DiscoverOptions {
    /// Options for [`discover_html_routes`]: no default excludes, since a
    /// built output tree has no server-only `/api` pages
    pub fn static_output() -> Self {
        Self {
            exclude: Vec::new(),
            ..Self::default()
        }
    }

    fn section_for(&self, path: &str) -> String {
        match &self.section_strategy {
            SectionStrategy::Custom(section) => section(path),
            SectionStrategy::Flat => self.default_section.clone(),
            SectionStrategy::Directory => match path.split('/').find(|s| !s.is_empty()) {
                Some(first) if !first.starts_with('[') => humanize(first),
                _ => self.default_section.clone(),
            },
        }
    }
}

/// Title and description declared in a page's metadata literal
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclaredMetadata {
    pub title: String,
    pub description: String,
}

/// Recover the declared title and description from page source
///
/// Finds `export const metadata = {` (optionally typed), takes the
/// brace-balanced object that follows, and returns the first quoted
/// `title:` and `description:` values inside it. Missing fields are empty.
///
/// # Examples
///
/// ```rust
/// use agent_seo_core::discover::extract_page_metadata;
///
/// let source = "export const metadata: Metadata = { title: 'Docs', description: \"All of it\" };";
/// let metadata = extract_page_metadata(source);
/// assert_eq!(metadata.title, "Docs");
/// assert_eq!(metadata.description, "All of it");
/// ```
pub fn extract_page_metadata(source: &str) -> DeclaredMetadata {
    let Some(export) = METADATA_EXPORT.as_ref().and_then(|re| re.find(source)) else {
        return DeclaredMetadata::default();
    };

    // The match ends with the opening brace
    let Some(object) = balanced_braces(&source[export.end() - 1..]) else {
        return DeclaredMetadata::default();
    };

    DeclaredMetadata {
        title: first_string_field(&TITLE_FIELD, object),
        description: first_string_field(&DESCRIPTION_FIELD, object),
    }
}

fn balanced_braces(source: &str) -> Option<&str> {
    if !source.starts_with('{') {
        return None;
    }
    let mut depth = 0usize;
    for (index, ch) in source.char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&source[..=index]);
                }
            }
            _ => {}
        }
    }
    None
}

fn first_string_field(field: &LazyLock<Option<Regex>>, object: &str) -> String {
    field
        .as_ref()
        .and_then(|re| re.captures(object))
        .and_then(|caps| caps.iter().skip(1).flatten().next().map(|m| m.as_str().to_string()))
        .unwrap_or_default()
}

/// Whether a discovered path is excluded
///
/// - `prefix/**` and `prefix/*` exclude `prefix` and everything below it
/// - `_name` excludes any path with a `_name` segment
/// - anything else excludes the exact path and everything below it
pub fn should_exclude(path: &str, patterns: &[String]) -> bool {
    patterns.iter().any(|pattern| {
        if let Some(prefix) = pattern
            .strip_suffix("/**")
            .or_else(|| pattern.strip_suffix("/*"))
        {
            path == prefix || path.starts_with(&format!("{}/", prefix))
        } else if pattern.starts_with('_') {
            path.starts_with(&format!("/{}", pattern)) || path.contains(&format!("/{}/", pattern))
        } else {
            path == pattern || path.starts_with(&format!("{}/", pattern))
        }
    })
}

/// Discover routes from an app-router page tree
///
/// # Arguments
///
/// * `app_dir` - Root of the page tree
/// * `options` - Exclusion and section options
///
/// # Returns
///
/// Routes sorted root first. A missing `app_dir` yields an empty list.
///
/// # Errors
///
/// Returns [`crate::AgentSeoError::Io`] if a directory cannot be listed.
/// Unreadable page files only lose their declared metadata.
pub fn discover_app_routes(app_dir: &Path, options: &DiscoverOptions) -> Result<Vec<ManifestRoute>> {
    if !app_dir.is_dir() {
        debug!(dir = %app_dir.display(), "page tree not found");
        return Ok(Vec::new());
    }

    let mut routes = Vec::new();
    scan_app_dir(app_dir, &mut Vec::new(), options, &mut routes)?;
    sort_routes(&mut routes);
    Ok(routes)
}

fn scan_app_dir(
    dir: &Path,
    segments: &mut Vec<String>,
    options: &DiscoverOptions,
    routes: &mut Vec<ManifestRoute>,
) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let path = entry.path();

        if entry.file_type()?.is_dir() {
            let lowered = name.to_lowercase();
            if lowered.starts_with('_')
                || lowered.starts_with('.')
                || SKIP_DIRS.contains(&lowered.as_str())
            {
                continue;
            }
            segments.push(name);
            scan_app_dir(&path, segments, options, routes)?;
            segments.pop();
            continue;
        }

        if !PAGE_FILES.contains(&name.as_str()) {
            continue;
        }

        let Some(url_path) = route_path(segments) else {
            continue;
        };
        if should_exclude(&url_path, &options.exclude)
            || url_path == SUMMARY_PATH
            || url_path == FULL_PATH
        {
            continue;
        }

        let declared = match fs::read_to_string(&path) {
            Ok(source) => extract_page_metadata(&source),
            Err(err) => {
                debug!(file = %path.display(), error = %err, "page source unreadable");
                DeclaredMetadata::default()
            }
        };

        routes.push(build_route(url_path, declared, options));
    }
    Ok(())
}

/// URL path for a page directory, `None` for catch-all routes
fn route_path(segments: &[String]) -> Option<String> {
    if segments
        .iter()
        .any(|s| s.contains("[...") || s.contains("[[..."))
    {
        return None;
    }
    let visible: Vec<&str> = segments
        .iter()
        .map(String::as_str)
        .filter(|s| !(s.starts_with('(') && s.ends_with(')')))
        .collect();
    Some(format!("/{}", visible.join("/")))
}

fn build_route(path: String, declared: DeclaredMetadata, options: &DiscoverOptions) -> ManifestRoute {
    let title = if declared.title.is_empty() {
        path_to_title(&path)
    } else {
        declared.title
    };
    ManifestRoute {
        section: Some(options.section_for(&path)),
        description: Some(declared.description).filter(|d| !d.is_empty()),
        title,
        path,
    }
}

/// Discover routes from a tree of built `.html` files
///
/// `index.html` maps to its directory path (`docs/index.html` is `/docs/`);
/// other files drop the extension. Titles come from `<title>`, falling back
/// to the path. Pair with [`DiscoverOptions::static_output`] unless the
/// `/api` exclude is wanted.
pub fn discover_html_routes(dir: &Path, options: &DiscoverOptions) -> Result<Vec<ManifestRoute>> {
    if !dir.is_dir() {
        debug!(dir = %dir.display(), "output tree not found");
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    find_html_files(dir, &mut Vec::new(), &mut files)?;

    let mut routes = Vec::new();
    for (segments, file) in files {
        let joined = segments.join("/");
        let path = match joined.strip_suffix("index.html") {
            Some(dir) if dir.is_empty() || dir.ends_with('/') => format!("/{}", dir),
            _ => format!("/{}", joined.trim_end_matches(".html")),
        };
        if should_exclude(&path, &options.exclude) {
            continue;
        }

        let title = fs::read_to_string(&file)
            .ok()
            .and_then(|html| {
                HTML_TITLE
                    .as_ref()?
                    .captures(&html)?
                    .get(1)
                    .map(|m| m.as_str().trim().to_string())
            })
            .unwrap_or_default();

        let declared = DeclaredMetadata {
            title,
            description: String::new(),
        };
        routes.push(build_route(path, declared, options));
    }

    sort_routes(&mut routes);
    Ok(routes)
}

fn find_html_files(
    dir: &Path,
    segments: &mut Vec<String>,
    files: &mut Vec<(Vec<String>, std::path::PathBuf)>,
) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();

        if entry.file_type()?.is_dir() {
            if SKIP_OUTPUT_DIRS.contains(&name.as_str()) {
                continue;
            }
            segments.push(name);
            find_html_files(&entry.path(), segments, files)?;
            segments.pop();
        } else if name.ends_with(".html") {
            let mut file_segments = segments.clone();
            file_segments.push(name);
            files.push((file_segments, entry.path()));
        }
    }
    Ok(())
}

fn sort_routes(routes: &mut [ManifestRoute]) {
    routes.sort_by(|a, b| match (a.path == "/", b.path == "/") {
        (true, false) => std::cmp::Ordering::Less,
        (false, true) => std::cmp::Ordering::Greater,
        _ => a.path.cmp(&b.path),
    });
}

/// `/docs/getting-started` becomes `Getting Started`, `/` becomes `Home`
fn path_to_title(path: &str) -> String {
    if path == "/" {
        return "Home".to_string();
    }
    let last = path.split('/').filter(|s| !s.is_empty()).next_back().unwrap_or("");
    if last.starts_with('[') {
        return last.trim_start_matches('[').trim_end_matches(']').to_string();
    }
    humanize(last)
}

/// `api-reference` becomes `Api Reference`
fn humanize(segment: &str) -> String {
    segment
        .split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_quote_styles() {
        let cases = [
            (r#"export const metadata = { title: "A", description: "B" };"#, "A", "B"),
            ("export const metadata = { title: 'A', description: 'B' };", "A", "B"),
            ("export const metadata = { title: `A`, description: `B` };", "A", "B"),
        ];
        for (source, title, description) in cases {
            let metadata = extract_page_metadata(source);
            assert_eq!(metadata.title, title, "{source}");
            assert_eq!(metadata.description, description, "{source}");
        }
    }

    #[test]
    fn test_metadata_typed_and_nested() {
        let source = r#"
            import type { Metadata } from 'next';
            export const metadata: Metadata = {
                title: "My App",
                description: "An app",
                openGraph: { title: "OG Title", images: ["/og.png"] },
            };
        "#;
        let metadata = extract_page_metadata(source);
        assert_eq!(metadata.title, "My App");
        assert_eq!(metadata.description, "An app");
    }

    #[test]
    fn test_metadata_missing() {
        let metadata = extract_page_metadata("export default function Page() { return null; }");
        assert_eq!(metadata, DeclaredMetadata::default());

        let metadata = extract_page_metadata(r#"export const metadata = { title: "Only Title" };"#);
        assert_eq!(metadata.title, "Only Title");
        assert_eq!(metadata.description, "");
    }

    #[test]
    fn test_metadata_unbalanced_object() {
        let metadata = extract_page_metadata(r#"export const metadata = { title: "Open""#);
        assert_eq!(metadata, DeclaredMetadata::default());
    }

    #[test]
    fn test_should_exclude() {
        let patterns: Vec<String> = ["/admin/**", "/internal/*", "_private", "/api"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert!(should_exclude("/admin", &patterns));
        assert!(should_exclude("/admin/users", &patterns));
        assert!(should_exclude("/internal/x/y", &patterns));
        assert!(should_exclude("/_private/x", &patterns));
        assert!(should_exclude("/docs/_private/x", &patterns));
        assert!(should_exclude("/api", &patterns));
        assert!(should_exclude("/api/v1", &patterns));
        assert!(!should_exclude("/apis", &patterns));
        assert!(!should_exclude("/administrator", &patterns));
    }

    #[test]
    fn test_titles_and_sections() {
        assert_eq!(path_to_title("/"), "Home");
        assert_eq!(path_to_title("/docs/getting-started"), "Getting Started");
        assert_eq!(path_to_title("/blog/[slug]"), "slug");

        let options = DiscoverOptions::default();
        assert_eq!(options.section_for("/"), "Pages");
        assert_eq!(options.section_for("/api-reference/x"), "Api Reference");
        assert_eq!(options.section_for("/[lang]/x"), "Pages");

        let flat = DiscoverOptions {
            section_strategy: SectionStrategy::Flat,
            ..Default::default()
        };
        assert_eq!(flat.section_for("/docs/x"), "Pages");
    }

    #[test]
    fn test_route_path() {
        fn segments(parts: &[&str]) -> Vec<String> {
            parts.iter().map(|part| part.to_string()).collect()
        }

        assert_eq!(route_path(&[]).as_deref(), Some("/"));
        assert_eq!(route_path(&segments(&["(marketing)", "pricing"])).as_deref(), Some("/pricing"));
        assert_eq!(route_path(&segments(&["blog", "[slug]"])).as_deref(), Some("/blog/[slug]"));
        assert_eq!(route_path(&segments(&["docs", "[...slug]"])), None);
        assert_eq!(route_path(&segments(&["[[...slug]]"])), None);
    }
}
