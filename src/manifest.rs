//! Site manifest generation (`llms.txt` and `llms-full.txt`)
//!
//! The summary manifest lists every route as a link to its text alternate,
//! grouped by section:
//!
//! ```text
//! # My App
//!
//! > A great application.
//!
//! ## Documentation
//!
//! - [Introduction](https://example.com/docs/intro.md): Getting started
//! ```
//!
//! The full manifest repeats the preamble and then inlines the text of every
//! route that has some, each block introduced by a horizontal rule.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::routing::PathPattern;

/// Manifest generation options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ManifestOptions {
    pub site_name: String,
    pub site_description: String,
    /// Site origin, e.g. `https://example.com`
    pub base_url: String,
    /// Extension appended to route paths in summary links
    pub alternate_extension: String,
    /// Section for routes that declare none
    pub default_section: String,
    /// Path globs removed before grouping
    pub exclude_patterns: Vec<String>,
}

impl Default for ManifestOptions {
    fn default() -> Self {
        Self {
            site_name: String::new(),
            site_description: String::new(),
            base_url: String::new(),
            alternate_extension: ".md".to_string(),
            default_section: "Pages".to_string(),
            exclude_patterns: Vec::new(),
        }
    }
}

/// A page listed in the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestRoute {
    pub path: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
}

impl ManifestRoute {
    pub fn new(path: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            title: title.into(),
            description: None,
            section: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }
}

/// Generated manifest texts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// `llms.txt` body
    pub summary: String,
    /// `llms-full.txt` body
    pub full: String,
    /// Number of routes emitted after exclusion
    pub route_count: usize,
}

/// Generate both manifests
///
/// # Arguments
///
/// * `options` - Site identity and formatting options
/// * `routes` - Routes in display order
/// * `full_text` - Text per route path for the full manifest; routes without
///   an entry (or with empty text) are left out of it
///
/// # Examples
///
/// ```rust
/// use agent_seo_core::manifest::{generate_manifest, ManifestOptions, ManifestRoute};
///
/// let options = ManifestOptions {
///     site_name: "My App".into(),
///     site_description: "A great application.".into(),
///     base_url: "https://example.com".into(),
///     ..Default::default()
/// };
/// let routes = [ManifestRoute::new("/docs/intro", "Introduction").with_section("Documentation")];
/// let manifest = generate_manifest(&options, &routes, None);
///
/// assert!(manifest.summary.contains("## Documentation"));
/// assert!(manifest.summary.contains("[Introduction](https://example.com/docs/intro.md)"));
/// ```
pub fn generate_manifest(
    options: &ManifestOptions,
    routes: &[ManifestRoute],
    full_text: Option<&HashMap<String, String>>,
) -> Manifest {
    let base_url = options.base_url.trim_end_matches('/');
    let excludes: Vec<PathPattern> = options
        .exclude_patterns
        .iter()
        .map(|pattern| PathPattern::new(pattern))
        .collect();

    let routes: Vec<&ManifestRoute> = routes
        .iter()
        .filter(|route| {
            let excluded = excludes.iter().any(|pattern| pattern.matches(&route.path));
            if excluded {
                debug!(path = %route.path, "route excluded from manifest");
            }
            !excluded
        })
        .collect();

    let preamble = [
        format!("# {}", options.site_name),
        String::new(),
        format!("> {}", options.site_description),
        String::new(),
    ];

    let mut lines: Vec<String> = preamble.to_vec();
    for (section, members) in group_by_section(&routes, &options.default_section) {
        lines.push(format!("## {}", section));
        lines.push(String::new());
        for route in members {
            let url = format!("{}{}{}", base_url, route.path, options.alternate_extension);
            match route.description.as_deref().filter(|d| !d.is_empty()) {
                Some(description) => {
                    lines.push(format!("- [{}]({}): {}", route.title, url, description))
                }
                None => lines.push(format!("- [{}]({})", route.title, url)),
            }
        }
        lines.push(String::new());
    }

    let mut full_lines: Vec<String> = preamble.to_vec();
    if let Some(contents) = full_text {
        for route in &routes {
            let Some(content) = contents.get(&route.path).filter(|c| !c.is_empty()) else {
                continue;
            };
            full_lines.push("---".to_string());
            full_lines.push(String::new());
            full_lines.push(format!("## {}", route.title));
            full_lines.push(format!("Source: {}{}", base_url, route.path));
            full_lines.push(String::new());
            full_lines.push(content.clone());
            full_lines.push(String::new());
        }
    }

    Manifest {
        summary: finish(&lines),
        full: finish(&full_lines),
        route_count: routes.len(),
    }
}

/// Group routes by section, sections ordered by first occurrence
fn group_by_section<'a>(
    routes: &[&'a ManifestRoute],
    default_section: &str,
) -> Vec<(String, Vec<&'a ManifestRoute>)> {
    let mut groups: Vec<(String, Vec<&'a ManifestRoute>)> = Vec::new();
    for route in routes {
        let section = route
            .section
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(default_section);
        match groups.iter_mut().find(|(name, _)| name == section) {
            Some((_, members)) => members.push(route),
            None => groups.push((section.to_string(), vec![route])),
        }
    }
    groups
}

fn finish(lines: &[String]) -> String {
    let mut text = lines.join("\n").trim().to_string();
    text.push('\n');
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> ManifestOptions {
        ManifestOptions {
            site_name: "My App".to_string(),
            site_description: "A great application.".to_string(),
            base_url: "https://example.com".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_summary_format() {
        let routes = [
            ManifestRoute::new("/docs/intro", "Introduction")
                .with_section("Documentation")
                .with_description("Start here"),
            ManifestRoute::new("/about", "About"),
        ];
        let manifest = generate_manifest(&options(), &routes, None);
        assert_eq!(
            manifest.summary,
            "# My App\n\n> A great application.\n\n## Documentation\n\n- [Introduction](https://example.com/docs/intro.md): Start here\n\n## Pages\n\n- [About](https://example.com/about.md)\n"
        );
        assert_eq!(manifest.route_count, 2);
    }

    #[test]
    fn test_sections_keep_first_occurrence_order() {
        let routes = [
            ManifestRoute::new("/z", "Z").with_section("Zebra"),
            ManifestRoute::new("/a", "A").with_section("Alpha"),
            ManifestRoute::new("/z2", "Z2").with_section("Zebra"),
        ];
        let summary = generate_manifest(&options(), &routes, None).summary;
        let zebra = summary.find("## Zebra").unwrap();
        let alpha = summary.find("## Alpha").unwrap();
        assert!(zebra < alpha);
        assert_eq!(summary.matches("## Zebra").count(), 1);
        assert!(summary.find("[Z2]").unwrap() < alpha);
    }

    #[test]
    fn test_sections_do_not_merge_by_case() {
        let routes = [
            ManifestRoute::new("/a", "A").with_section("Docs"),
            ManifestRoute::new("/b", "B").with_section("docs"),
        ];
        let summary = generate_manifest(&options(), &routes, None).summary;
        assert!(summary.contains("## Docs"));
        assert!(summary.contains("## docs"));
    }

    #[test]
    fn test_empty_routes() {
        let manifest = generate_manifest(&options(), &[], None);
        assert_eq!(manifest.summary, "# My App\n\n> A great application.\n");
        assert_eq!(manifest.full, "# My App\n\n> A great application.\n");
        assert_eq!(manifest.route_count, 0);
    }

    #[test]
    fn test_full_text() {
        let routes = [
            ManifestRoute::new("/one", "One"),
            ManifestRoute::new("/two", "Two"),
            ManifestRoute::new("/three", "Three"),
        ];
        let mut contents = HashMap::new();
        contents.insert("/three".to_string(), "Third body".to_string());
        contents.insert("/one".to_string(), "First body".to_string());
        contents.insert("/two".to_string(), String::new());

        let full = generate_manifest(&options(), &routes, Some(&contents)).full;
        assert_eq!(
            full,
            "# My App\n\n> A great application.\n\n---\n\n## One\nSource: https://example.com/one\n\nFirst body\n\n---\n\n## Three\nSource: https://example.com/three\n\nThird body\n"
        );
    }

    #[test]
    fn test_trailing_slash_and_extension() {
        let options = ManifestOptions {
            base_url: "https://example.com/".to_string(),
            alternate_extension: ".txt".to_string(),
            default_section: "Misc".to_string(),
            ..options()
        };
        let summary = generate_manifest(&options, &[ManifestRoute::new("/x", "X")], None).summary;
        assert!(summary.contains("## Misc"));
        assert!(summary.contains("[X](https://example.com/x.txt)"));
    }

    #[test]
    fn test_exclude_patterns() {
        let options = ManifestOptions {
            exclude_patterns: vec!["/admin/**".to_string(), "/private".to_string()],
            ..options()
        };
        let routes = [
            ManifestRoute::new("/admin/users", "Users"),
            ManifestRoute::new("/private", "Private"),
            ManifestRoute::new("/public", "Public"),
        ];
        let manifest = generate_manifest(&options, &routes, None);
        assert_eq!(manifest.route_count, 1);
        assert!(!manifest.summary.contains("Users"));
        assert!(!manifest.summary.contains("Private"));
        assert!(manifest.summary.contains("Public"));
    }

    #[test]
    fn test_options_from_json() {
        let options: ManifestOptions = serde_json::from_str(
            r#"{"siteName": "S", "siteDescription": "D", "baseUrl": "https://s.dev"}"#,
        )
        .unwrap();
        assert_eq!(options.alternate_extension, ".md");
        assert_eq!(options.default_section, "Pages");
    }
}
