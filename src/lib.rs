//! Agent SEO core
//!
//! Serves AI agents a clean text rendition of HTML pages alongside the
//! human-facing HTML, and publishes `llms.txt` style site manifests.
//!
//! # Architecture
//!
//! The library is structured into several modules:
//! - `transform`: HTML to Markdown pipeline with frontmatter and token budget
//! - `parser`, `charset`, `dom`: HTML5 parsing using html5ever
//! - `metadata`, `structured_data`: page metadata and JSON-LD extraction
//! - `extract`: reader-mode main content selection
//! - `sanitizer`: noise stripping by selector and link density
//! - `converter`: Markdown generation from the DOM tree
//! - `token_estimator`: token count estimation and budget truncation
//! - `classifier`: AI crawler identification and content negotiation
//! - `manifest`, `discover`: manifest generation and route discovery
//! - `cache`: bounded TTL cache for transform results
//! - `config`, `routing`, `headers`, `etag_generator`: the request-level
//!   service that ties the pieces together
//!
//! # Example
//!
//! ```rust
//! use agent_seo_core::{classify, transform, TransformOptions};
//!
//! let html = "<html><head><title>Hello</title></head>\
//!             <body><article><h1>Hello</h1><p>World.</p></article></body></html>";
//! let result = transform(html, &TransformOptions::default());
//! assert!(result.text.contains("# Hello"));
//!
//! let agent = classify(Some("Mozilla/5.0 (compatible; GPTBot/1.0)"), None);
//! assert!(agent.is_ai_bot);
//! ```

pub mod cache;
pub mod charset;
pub mod classifier;
pub mod config;
pub mod converter;
pub mod discover;
pub mod dom;
pub mod error;
pub mod etag_generator;
pub mod extract;
pub mod frontmatter;
pub mod headers;
pub mod manifest;
pub mod metadata;
pub mod parser;
pub mod routing;
pub mod sanitizer;
pub mod structured_data;
pub mod token_estimator;
pub mod transform;

// Re-export main types for convenience
pub use cache::{CacheOptions, TransformCache};
pub use classifier::{
    AgentClassification, BotInfo, BotPurpose, BotRegistry, classify, should_serve_alternate,
};
pub use config::AgentSeoConfig;
pub use converter::{MarkdownConverter, RenderRule};
pub use discover::{DiscoverOptions, SectionStrategy, discover_app_routes, discover_html_routes};
pub use error::{AgentSeoError, Result};
pub use manifest::{Manifest, ManifestOptions, ManifestRoute, generate_manifest};
pub use routing::{AgentSeo, AlternateResponse, RequestPlan};
pub use sanitizer::{SanitizeOptions, sanitize};
pub use token_estimator::{estimate_tokens, truncate_to_budget};
pub use transform::{TransformOptions, TransformResult, Transformer, transform, transform_bytes};
