//! Site configuration for the agent SEO service
//!
//! Configuration is a JSON document with camelCase keys. Every section is
//! optional except the site identity:
//!
//! ```json
//! {
//!   "siteName": "My App",
//!   "siteDescription": "A great application.",
//!   "baseUrl": "https://example.com",
//!   "include": ["/docs/**"],
//!   "exclude": ["/api/**"],
//!   "transform": { "tokenBudget": 4000 },
//!   "manifest": {
//!     "routes": [{ "path": "/docs/intro", "title": "Introduction", "section": "Docs" }]
//!   },
//!   "cache": { "enabled": true, "maxEntries": 100, "ttlMs": 300000 },
//!   "contentSignal": { "aiTrain": false }
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::cache::CacheOptions;
use crate::error::{AgentSeoError, Result};
use crate::headers::ContentSignal;
use crate::manifest::{ManifestOptions, ManifestRoute};
use crate::transform::TransformOptions;

/// Paths never transformed unless the caller overrides the list
pub const DEFAULT_EXCLUDES: &[&str] = &[
    "/api/**",
    "/_next/**",
    "/static/**",
    "/assets/**",
    "/favicon.ico",
];

/// Complete service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSeoConfig {
    pub site_name: String,
    pub site_description: String,
    /// Site origin used for manifest links and transform URLs
    pub base_url: String,
    /// Path globs eligible for transformation; empty means every path
    #[serde(default)]
    pub include: Vec<String>,
    /// Path globs never transformed
    #[serde(default = "default_excludes")]
    pub exclude: Vec<String>,
    /// Transform options; `url` is set per request
    #[serde(default)]
    pub transform: TransformOptions,
    #[serde(default)]
    pub manifest: ManifestSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub content_signal: ContentSignal,
}

/// Manifest section of the configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ManifestSettings {
    pub routes: Vec<ManifestRoute>,
    pub exclude_patterns: Vec<String>,
    pub alternate_extension: String,
    pub default_section: String,
}

impl Default for ManifestSettings {
    fn default() -> Self {
        let defaults = ManifestOptions::default();
        Self {
            routes: Vec::new(),
            exclude_patterns: Vec::new(),
            alternate_extension: defaults.alternate_extension,
            default_section: defaults.default_section,
        }
    }
}

/// Cache section of the configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CacheSettings {
    pub enabled: bool,
    pub max_entries: usize,
    pub ttl_ms: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        let defaults = CacheOptions::default();
        Self {
            enabled: true,
            max_entries: defaults.max_entries,
            ttl_ms: defaults.ttl_ms,
        }
    }
}

impl CacheSettings {
    /// Cache options, or `None` when caching is disabled
    pub fn options(&self) -> Option<CacheOptions> {
        self.enabled.then_some(CacheOptions {
            max_entries: self.max_entries,
            ttl_ms: self.ttl_ms,
        })
    }
}

fn default_excludes() -> Vec<String> {
    DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect()
}

impl AgentSeoConfig {
    /// Configuration with the given identity and every other setting at its default
    pub fn new(
        site_name: impl Into<String>,
        site_description: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            site_name: site_name.into(),
            site_description: site_description.into(),
            base_url: base_url.into(),
            include: Vec::new(),
            exclude: default_excludes(),
            transform: TransformOptions::default(),
            manifest: ManifestSettings::default(),
            cache: CacheSettings::default(),
            content_signal: ContentSignal::default(),
        }
    }

    /// Parse and validate a JSON configuration
    pub fn from_json_str(source: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(source)
            .map_err(|e| AgentSeoError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|e| {
            AgentSeoError::Config(format!("Failed to read config {}: {e}", path.display()))
        })?;
        Self::from_json_str(&source)
    }

    /// Check the configuration for values the service cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.site_name.trim().is_empty() {
            return Err(AgentSeoError::Config("siteName must not be empty".into()));
        }

        let base = Url::parse(&self.base_url)
            .map_err(|e| AgentSeoError::Config(format!("Invalid baseUrl {:?}: {e}", self.base_url)))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(AgentSeoError::Config(format!(
                "baseUrl must use http or https, got {:?}",
                base.scheme()
            )));
        }

        if self.cache.enabled && self.cache.max_entries == 0 {
            return Err(AgentSeoError::Config(
                "cache.maxEntries must be positive when caching is enabled".into(),
            ));
        }

        let extension = &self.manifest.alternate_extension;
        if !extension.starts_with('.') || extension.len() < 2 || extension.contains('/') {
            return Err(AgentSeoError::Config(format!(
                "manifest.alternateExtension must look like \".md\", got {:?}",
                extension
            )));
        }

        Ok(())
    }

    /// Base URL without a trailing slash
    pub fn origin(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Manifest generation options derived from the configuration
    pub fn manifest_options(&self) -> ManifestOptions {
        ManifestOptions {
            site_name: self.site_name.clone(),
            site_description: self.site_description.clone(),
            base_url: self.base_url.clone(),
            alternate_extension: self.manifest.alternate_extension.clone(),
            default_section: self.manifest.default_section.clone(),
            exclude_patterns: self.manifest.exclude_patterns.clone(),
        }
    }
}
