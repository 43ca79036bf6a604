//! Request routing for the agent SEO service
//!
//! [`AgentSeo`] makes the per-request decisions a web layer needs and
//! performs the sink-and-replace step. The host buffers the upstream HTML
//! response in full, hands it to [`AgentSeo::render_alternate`] once, and
//! emits the returned replacement. No socket or framework I/O happens here.
//!
//! # Examples
//!
//! ```rust
//! use agent_seo_core::config::AgentSeoConfig;
//! use agent_seo_core::routing::{AgentSeo, RequestPlan};
//!
//! let service = AgentSeo::new(AgentSeoConfig::new("My App", "A great application.", "https://example.com")).unwrap();
//!
//! assert!(matches!(service.plan("/llms.txt", None, None), RequestPlan::Manifest { full: false }));
//! assert!(matches!(
//!     service.plan("/docs", Some("Mozilla/5.0 GPTBot/1.0"), None),
//!     RequestPlan::ServeAlternate { .. }
//! ));
//! assert!(matches!(
//!     service.plan("/docs", Some("Mozilla/5.0 Chrome/120.0"), None),
//!     RequestPlan::PassThrough { .. }
//! ));
//! ```

use std::collections::HashMap;

use regex::Regex;
use tracing::{debug, warn};

use crate::cache::TransformCache;
use crate::classifier::{AgentClassification, BotRegistry};
use crate::config::AgentSeoConfig;
use crate::error::Result;
use crate::etag_generator::ETagGenerator;
use crate::headers::{
    FULL_PATH, HeaderList, SUMMARY_PATH, VARY_AGENT, alternate_headers, alternate_link_header,
    manifest_headers,
};
use crate::manifest::generate_manifest;
use crate::transform::{TransformOptions, TransformResult, Transformer};

/// Anchored path glob
///
/// `**` matches any run of characters including `/`; `*` matches within one
/// path segment. Everything else is literal.
#[derive(Debug, Clone)]
pub struct PathPattern {
    source: String,
    regex: Option<Regex>,
}

impl PathPattern {
    pub fn new(pattern: &str) -> Self {
        let body = pattern
            .split("**")
            .map(|part| {
                part.split('*')
                    .map(regex::escape)
                    .collect::<Vec<_>>()
                    .join("[^/]*")
            })
            .collect::<Vec<_>>()
            .join(".*");

        let regex = match Regex::new(&format!("^{}$", body)) {
            Ok(regex) => Some(regex),
            Err(err) => {
                warn!(pattern, error = %err, "path pattern never matches");
                None
            }
        };

        Self {
            source: pattern.to_string(),
            regex,
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        self.regex.as_ref().is_some_and(|regex| regex.is_match(path))
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

/// What the host should do with a request
#[derive(Debug, Clone, PartialEq)]
pub enum RequestPlan {
    /// Respond with [`AgentSeo::manifest`]
    Manifest { full: bool },
    /// Buffer the upstream response for `path` and pass it to
    /// [`AgentSeo::render_alternate`]
    ServeAlternate {
        path: String,
        /// The alternate was requested by URL rather than by classification
        explicit: bool,
        classification: AgentClassification,
    },
    /// Serve the upstream response untouched, adding `headers`
    PassThrough { headers: HeaderList },
}

/// Replacement response produced by the service
#[derive(Debug, Clone, PartialEq)]
pub struct AlternateResponse {
    pub status: u16,
    pub headers: HeaderList,
    pub body: Vec<u8>,
    /// Whether `body` is a transform rather than the original upstream body
    pub transformed: bool,
}

impl AlternateResponse {
    fn text(headers: HeaderList, body: String) -> Self {
        Self {
            status: 200,
            headers,
            body: body.into_bytes(),
            transformed: true,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Whether a conditional request with `if_none_match` can be answered
    /// with `304 Not Modified`
    pub fn is_not_modified(&self, if_none_match: Option<&str>) -> bool {
        self.header("ETag")
            .is_some_and(|etag| ETagGenerator::new().matches(if_none_match, etag))
    }
}

/// Agent SEO service
///
/// Owns the configuration, the bot registry, the optional result cache and
/// the transformer. Shareable across request handlers.
pub struct AgentSeo {
    config: AgentSeoConfig,
    registry: BotRegistry,
    cache: Option<TransformCache>,
    transformer: Transformer,
    includes: Vec<PathPattern>,
    excludes: Vec<PathPattern>,
}

impl AgentSeo {
    /// Build the service from a validated configuration
    pub fn new(config: AgentSeoConfig) -> Result<Self> {
        config.validate()?;

        let cache = config.cache.options().map(TransformCache::new);
        let includes = config.include.iter().map(|p| PathPattern::new(p)).collect();
        let excludes = config.exclude.iter().map(|p| PathPattern::new(p)).collect();

        Ok(Self {
            config,
            registry: BotRegistry::default(),
            cache,
            transformer: Transformer::new(),
            includes,
            excludes,
        })
    }

    /// Replace the bot registry
    pub fn with_registry(mut self, registry: BotRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Replace the transformer
    pub fn with_transformer(mut self, transformer: Transformer) -> Self {
        self.transformer = transformer;
        self
    }

    pub fn config(&self) -> &AgentSeoConfig {
        &self.config
    }

    pub fn cache(&self) -> Option<&TransformCache> {
        self.cache.as_ref()
    }

    fn is_excluded(&self, path: &str) -> bool {
        self.excludes.iter().any(|pattern| pattern.matches(path))
    }

    fn is_included(&self, path: &str) -> bool {
        self.includes.is_empty() || self.includes.iter().any(|pattern| pattern.matches(path))
    }

    /// Page path behind an alternate URL, if `path` is one
    ///
    /// `/docs/intro.md` maps to `/docs/intro` and `/index.md` to `/`.
    pub fn page_path_for(&self, path: &str) -> Option<String> {
        let stripped = path.strip_suffix(self.config.manifest.alternate_extension.as_str())?;
        if stripped.is_empty() || stripped.ends_with('/') {
            return None;
        }
        Some(match stripped.strip_suffix("index") {
            Some(dir) if dir.ends_with('/') => dir.to_string(),
            _ => stripped.to_string(),
        })
    }

    /// Decide how to handle a request
    pub fn plan(&self, path: &str, user_agent: Option<&str>, accept: Option<&str>) -> RequestPlan {
        match path {
            SUMMARY_PATH => return RequestPlan::Manifest { full: false },
            FULL_PATH => return RequestPlan::Manifest { full: true },
            _ => {}
        }

        let classification = self.registry.classify(user_agent, accept);

        if let Some(page) = self.page_path_for(path) {
            return RequestPlan::ServeAlternate {
                path: page,
                explicit: true,
                classification,
            };
        }

        let excluded = self.is_excluded(path);
        if classification.should_serve_alternate() && !excluded && self.is_included(path) {
            debug!(
                path,
                bot = classification.bot.as_ref().map(|bot| bot.name.as_str()),
                "serving text alternate"
            );
            return RequestPlan::ServeAlternate {
                path: path.to_string(),
                explicit: false,
                classification,
            };
        }

        let mut headers: HeaderList = vec![("Vary", VARY_AGENT.to_string())];
        if !excluded {
            headers.push((
                "Link",
                alternate_link_header(path, &self.config.manifest.alternate_extension),
            ));
        }
        RequestPlan::PassThrough { headers }
    }

    /// Render a manifest response
    ///
    /// The full manifest inlines the cached text of every configured route
    /// that has been transformed and is still cached.
    pub fn manifest(&self, full: bool) -> AlternateResponse {
        let routes = &self.config.manifest.routes;
        let contents: Option<HashMap<String, String>> = full.then(|| {
            routes
                .iter()
                .filter_map(|route| {
                    let cached = self.cache.as_ref()?.get(&route.path)?;
                    Some((route.path.clone(), cached.text))
                })
                .collect()
        });

        let manifest = generate_manifest(&self.config.manifest_options(), routes, contents.as_ref());
        let body = if full { manifest.full } else { manifest.summary };
        AlternateResponse::text(manifest_headers(), body)
    }

    /// Replace a buffered upstream response with its text alternate
    ///
    /// # Arguments
    ///
    /// * `path` - Page path, used as the cache key and appended to the base URL
    /// * `body` - The complete upstream response body
    /// * `content_type` - Upstream `Content-Type`
    ///
    /// # Returns
    ///
    /// The upstream body unchanged for non-HTML responses; otherwise the
    /// transformed text with alternate headers and an ETag.
    pub fn render_alternate(
        &self,
        path: &str,
        body: &[u8],
        content_type: Option<&str>,
    ) -> AlternateResponse {
        let is_html = content_type.is_some_and(|ct| ct.to_ascii_lowercase().contains("text/html"));
        if !is_html {
            debug!(path, content_type, "not HTML, passing body through");
            return AlternateResponse {
                status: 200,
                headers: Vec::new(),
                body: body.to_vec(),
                transformed: false,
            };
        }

        let result = match self.cache.as_ref().and_then(|cache| cache.get(path)) {
            Some(cached) => {
                debug!(path, "text alternate served from cache");
                cached
            }
            None => {
                let result = self.transform_page(path, body, content_type);
                if let Some(cache) = &self.cache {
                    cache.set(path, result.clone());
                }
                result
            }
        };

        let mut headers = alternate_headers(&result, &self.config.content_signal);
        headers.push(("ETag", ETagGenerator::new().for_text(&result.text)));
        AlternateResponse::text(headers, result.text)
    }

    fn transform_page(&self, path: &str, body: &[u8], content_type: Option<&str>) -> TransformResult {
        let options = TransformOptions {
            url: Some(format!("{}{}", self.config.origin(), path)),
            ..self.config.transform.clone()
        };
        self.transformer.transform_bytes(body, content_type, &options)
    }
}
