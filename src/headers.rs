//! Response headers for text alternates and manifests
//!
//! Headers are returned as ordered `(name, value)` pairs so any HTTP layer
//! can apply them without this crate depending on one.

use serde::{Deserialize, Serialize};

use crate::transform::TransformResult;

/// Path of the summary manifest
pub const SUMMARY_PATH: &str = "/llms.txt";

/// Path of the full-text manifest
pub const FULL_PATH: &str = "/llms-full.txt";

pub const MARKDOWN_CONTENT_TYPE: &str = "text/markdown; charset=utf-8";

pub const MANIFEST_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// `Vary` value for every response whose representation depends on the agent
pub const VARY_AGENT: &str = "Accept, User-Agent";

/// Ordered header list
pub type HeaderList = Vec<(&'static str, String)>;

/// Content usage permissions advertised in the `Content-Signal` header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContentSignal {
    pub ai_train: bool,
    pub search: bool,
    pub ai_input: bool,
}

impl Default for ContentSignal {
    fn default() -> Self {
        Self {
            ai_train: true,
            search: true,
            ai_input: true,
        }
    }
}

impl ContentSignal {
    /// Header value, or `None` when every permission is off
    pub fn header_value(&self) -> Option<String> {
        let parts: Vec<&str> = [
            (self.ai_train, "ai-train=yes"),
            (self.search, "search=yes"),
            (self.ai_input, "ai-input=yes"),
        ]
        .into_iter()
        .filter_map(|(enabled, part)| enabled.then_some(part))
        .collect();

        (!parts.is_empty()).then(|| parts.join(", "))
    }
}

/// Headers for a text alternate response
///
/// # Examples
///
/// ```rust
/// use agent_seo_core::headers::{alternate_headers, ContentSignal};
/// use agent_seo_core::transform::TransformResult;
///
/// let result = TransformResult { token_estimate: 42, ..Default::default() };
/// let headers = alternate_headers(&result, &ContentSignal::default());
///
/// assert!(headers.contains(&("X-Markdown-Tokens", "42".to_string())));
/// assert!(headers.contains(&("Content-Signal", "ai-train=yes, search=yes, ai-input=yes".to_string())));
/// ```
pub fn alternate_headers(result: &TransformResult, signal: &ContentSignal) -> HeaderList {
    let mut headers: HeaderList = vec![
        ("Content-Type", MARKDOWN_CONTENT_TYPE.to_string()),
        ("Content-Disposition", "inline".to_string()),
        ("Vary", VARY_AGENT.to_string()),
        ("X-Markdown-Tokens", result.token_estimate.to_string()),
    ];
    if let Some(value) = signal.header_value() {
        headers.push(("Content-Signal", value));
    }
    headers.push(("X-Robots-Tag", "all".to_string()));
    headers
}

/// `Link` header value advertising the text alternate of `path`
///
/// A path ending in `/` maps to `index` plus the extension.
pub fn alternate_link_header(path: &str, extension: &str) -> String {
    let alternate = if path.ends_with('/') {
        format!("{}index{}", path, extension)
    } else {
        format!("{}{}", path, extension)
    };
    format!("<{}>; rel=\"alternate\"; type=\"text/markdown\"", alternate)
}

/// Headers for manifest responses
pub fn manifest_headers() -> HeaderList {
    vec![
        ("Content-Type", MANIFEST_CONTENT_TYPE.to_string()),
        ("Cache-Control", "public, max-age=3600".to_string()),
    ]
}
