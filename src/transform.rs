//! Transform orchestrator
//!
//! Threads one document through the pipeline:
//!
//! 1. Parse the document
//! 2. Extract metadata and structured data from the untouched tree
//! 3. Select the main content (reader mode or body fallback)
//! 4. Sanitize the selected markup
//! 5. Render Markdown
//! 6. Prefix the frontmatter block
//! 7. Enforce the token budget
//!
//! Every stage recovers from bad input locally, so [`Transformer::transform`]
//! always returns a [`TransformResult`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

use crate::charset::decode_html_lossy;
use crate::converter::{MarkdownConverter, RenderRule};
use crate::extract::{ReadabilityReader, ReaderMode, extract_main_content};
use crate::frontmatter::{FrontmatterInput, build_frontmatter};
use crate::metadata::extract_metadata;
use crate::parser::parse_document;
use crate::sanitizer::{DensityThresholds, SanitizeOptions, Sanitizer};
use crate::structured_data::extract_structured_data;
use crate::token_estimator::TokenEstimator;

/// Options for a single transform call
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransformOptions {
    /// Document URL: link resolution base, reader-mode URL and frontmatter `url`
    pub url: Option<String>,
    /// Maximum token estimate of the output text
    pub token_budget: Option<u32>,
    /// Extract JSON-LD structured data
    pub extract_structured_data: bool,
    /// Extra selectors to strip during sanitization
    pub strip_selectors: Vec<String>,
    /// Selectors never stripped during sanitization
    pub preserve_selectors: Vec<String>,
    /// Prefix a frontmatter block
    pub frontmatter: bool,
    /// Low density thresholds for the sanitizer
    pub density: DensityThresholds,
    /// Caller render rules, checked before the built-in ones
    #[serde(skip)]
    pub render_rules: Vec<RenderRule>,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            url: None,
            token_budget: None,
            extract_structured_data: true,
            strip_selectors: Vec::new(),
            preserve_selectors: Vec::new(),
            frontmatter: true,
            density: DensityThresholds::default(),
            render_rules: Vec::new(),
        }
    }
}

impl TransformOptions {
    fn sanitize_options(&self) -> SanitizeOptions {
        SanitizeOptions {
            strip_selectors: self.strip_selectors.clone(),
            preserve_selectors: self.preserve_selectors.clone(),
            density: self.density,
        }
    }
}

/// Result of transforming one document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformResult {
    /// Markdown output, frontmatter included
    pub text: String,
    /// `ceil(chars(text) / 4)`, computed after truncation
    pub token_estimate: u32,
    pub title: String,
    pub description: String,
    pub structured_data: Vec<Value>,
    pub canonical_url: Option<String>,
    pub last_modified: Option<String>,
    pub lang: Option<String>,
}

/// HTML to Markdown pipeline
///
/// Holds the reader-mode service; everything else is per call. A transformer
/// is `Send + Sync` and can serve concurrent calls.
pub struct Transformer {
    reader: Box<dyn ReaderMode>,
    estimator: TokenEstimator,
}

impl Transformer {
    /// Create a transformer backed by readability
    pub fn new() -> Self {
        Self::with_reader(Box::new(ReadabilityReader))
    }

    /// Create a transformer with a custom reader-mode service
    pub fn with_reader(reader: Box<dyn ReaderMode>) -> Self {
        Self {
            reader,
            estimator: TokenEstimator::new(),
        }
    }

    /// Transform an HTML document
    ///
    /// # Arguments
    ///
    /// * `html` - Document source, possibly empty or malformed
    /// * `options` - Per-call options
    ///
    /// # Returns
    ///
    /// A complete [`TransformResult`]. Degenerate input yields empty
    /// metadata and minimal text, never an error.
    pub fn transform(&self, html: &str, options: &TransformOptions) -> TransformResult {
        let url = options.url.as_deref();
        let dom = parse_document(html);

        let metadata = extract_metadata(&dom);
        let structured_data = if options.extract_structured_data {
            extract_structured_data(&dom)
        } else {
            Vec::new()
        };

        let content = extract_main_content(self.reader.as_ref(), html, &dom, url);
        trace!(content_bytes = content.len(), "selected main content");
        let clean = Sanitizer::new(&options.sanitize_options()).sanitize(&content);

        let converter = MarkdownConverter::new()
            .with_base_url(url)
            .with_rules(options.render_rules.clone());
        let body = converter.convert_fragment(&clean);

        let mut text = if options.frontmatter {
            let header = build_frontmatter(&FrontmatterInput {
                title: &metadata.title,
                description: &metadata.description,
                url,
                lang: metadata.lang.as_deref(),
                last_modified: metadata.last_modified.as_deref(),
                structured_data: &structured_data,
            });
            format!("{}\n\n{}", header, body)
        } else {
            body
        };

        if let Some(budget) = options.token_budget
            && self.estimator.estimate(&text) > budget
        {
            text = self.estimator.truncate(&text, budget).into_owned();
        }

        TransformResult {
            token_estimate: self.estimator.estimate(&text),
            text,
            title: metadata.title,
            description: metadata.description,
            structured_data,
            canonical_url: metadata.canonical_url,
            last_modified: metadata.last_modified,
            lang: metadata.lang,
        }
    }

    /// Transform an HTML body given as bytes
    ///
    /// The charset comes from `content_type`, then an early `<meta charset>`,
    /// then UTF-8. Undecodable input is decoded lossily.
    pub fn transform_bytes(
        &self,
        html: &[u8],
        content_type: Option<&str>,
        options: &TransformOptions,
    ) -> TransformResult {
        let decoded = decode_html_lossy(html, content_type);
        self.transform(&decoded, options)
    }
}

impl Default for Transformer {
    fn default() -> Self {
        Self::new()
    }
}

/// Transform with the default readability-backed transformer
///
/// # Examples
///
/// ```rust
/// use agent_seo_core::transform::{transform, TransformOptions};
///
/// let html = "<html><head><title>Test Page</title></head><body><article><h1>Hello</h1><p>World</p></article></body></html>";
/// let result = transform(html, &TransformOptions::default());
///
/// assert_eq!(result.title, "Test Page");
/// assert!(result.text.contains("title: \"Test Page\""));
/// assert!(result.text.lines().any(|line| line.starts_with("# ")));
/// ```
pub fn transform(html: &str, options: &TransformOptions) -> TransformResult {
    Transformer::new().transform(html, options)
}

/// Byte-input variant of [`transform`]
pub fn transform_bytes(
    html: &[u8],
    content_type: Option<&str>,
    options: &TransformOptions,
) -> TransformResult {
    Transformer::new().transform_bytes(html, content_type, options)
}
