//! AI agent classification
//!
//! Requests are classified by matching the User-Agent against an ordered bot
//! registry. The first matching entry wins. Patterns made only of ASCII
//! letters, digits and hyphens match by case-insensitive containment; any
//! other pattern is compiled as a case-insensitive regular expression.
//!
//! The Accept header is checked independently: a client asking for
//! `text/markdown` wants the alternate format whether or not it is a bot.
//!
//! # Examples
//!
//! ```rust
//! use agent_seo_core::classifier::{classify, BotPurpose};
//!
//! let result = classify(Some("Mozilla/5.0 GPTBot/1.0"), None);
//! assert!(result.is_ai_bot);
//!
//! let bot = result.bot.unwrap();
//! assert_eq!(bot.name, "GPTBot");
//! assert_eq!(bot.operator, "OpenAI");
//! assert_eq!(bot.purpose, BotPurpose::Training);
//! ```

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// What a bot does with fetched content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BotPurpose {
    Training,
    Search,
    AgentBrowsing,
    Unknown,
}

/// Registry metadata for a known bot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotInfo {
    pub name: String,
    pub operator: String,
    pub purpose: BotPurpose,
    pub renders_js: bool,
}

impl BotInfo {
    pub fn new(
        name: impl Into<String>,
        operator: impl Into<String>,
        purpose: BotPurpose,
        renders_js: bool,
    ) -> Self {
        Self {
            name: name.into(),
            operator: operator.into(),
            purpose,
            renders_js,
        }
    }
}

/// Per-request classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentClassification {
    #[serde(rename = "isAIBot")]
    pub is_ai_bot: bool,
    pub bot: Option<BotInfo>,
    pub wants_alternate_format: bool,
}

impl AgentClassification {
    /// Whether the alternate text format should be served
    pub fn should_serve_alternate(&self) -> bool {
        self.is_ai_bot || self.wants_alternate_format
    }
}

#[derive(Debug, Clone)]
enum Matcher {
    /// Lowercased literal, matched against the lowercased User-Agent
    Literal(String),
    Pattern(Regex),
}

impl Matcher {
    fn compile(pattern: &str) -> Option<Self> {
        let is_literal = !pattern.is_empty()
            && pattern
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-');
        if is_literal {
            return Some(Matcher::Literal(pattern.to_ascii_lowercase()));
        }

        match Regex::new(&format!("(?i){}", pattern)) {
            Ok(regex) => Some(Matcher::Pattern(regex)),
            Err(err) => {
                warn!(pattern, error = %err, "skipping invalid bot pattern");
                None
            }
        }
    }

    fn is_match(&self, user_agent: &str, lowered: &str) -> bool {
        match self {
            Matcher::Literal(token) => lowered.contains(token.as_str()),
            Matcher::Pattern(regex) => regex.is_match(user_agent),
        }
    }
}

#[derive(Debug, Clone)]
struct BotEntry {
    matcher: Matcher,
    info: BotInfo,
}

/// Ordered bot registry, immutable after construction
#[derive(Debug, Clone)]
pub struct BotRegistry {
    entries: Vec<BotEntry>,
}

const DEFAULT_BOTS: &[(&str, &str, &str, BotPurpose, bool)] = &[
    ("GPTBot", "GPTBot", "OpenAI", BotPurpose::Training, false),
    ("OAI-SearchBot", "OAI-SearchBot", "OpenAI", BotPurpose::Search, false),
    ("ChatGPT-User", "ChatGPT-User", "OpenAI", BotPurpose::AgentBrowsing, true),
    ("ClaudeBot", "ClaudeBot", "Anthropic", BotPurpose::Training, false),
    ("Claude-User", "Claude-User", "Anthropic", BotPurpose::AgentBrowsing, true),
    ("Claude-SearchBot", "Claude-SearchBot", "Anthropic", BotPurpose::Search, false),
    ("anthropic-ai", "anthropic-ai", "Anthropic", BotPurpose::Training, false),
    ("PerplexityBot", "PerplexityBot", "Perplexity", BotPurpose::Search, false),
    ("Perplexity-User", "Perplexity-User", "Perplexity", BotPurpose::AgentBrowsing, true),
    ("Google-Extended", "Google-Extended", "Google", BotPurpose::Training, true),
    ("Applebot-Extended", "Applebot-Extended", "Apple", BotPurpose::Training, true),
    ("meta-externalagent", "Meta-ExternalAgent", "Meta", BotPurpose::Training, false),
    ("FacebookBot", "FacebookBot", "Meta", BotPurpose::Search, false),
    ("CCBot", "CCBot", "Common Crawl", BotPurpose::Training, false),
    ("cohere-ai", "cohere-ai", "Cohere", BotPurpose::Training, false),
    ("Amazonbot", "Amazonbot", "Amazon", BotPurpose::Search, false),
    ("Bytespider", "Bytespider", "ByteDance", BotPurpose::Training, false),
    ("YouBot", "YouBot", "You.com", BotPurpose::Search, false),
    ("Deepseek", "DeepSeekBot", "DeepSeek", BotPurpose::Training, false),
];

static DEFAULT_REGISTRY: LazyLock<BotRegistry> = LazyLock::new(|| {
    BotRegistry::with_entries(DEFAULT_BOTS.iter().map(
        |&(pattern, name, operator, purpose, renders_js)| {
            (pattern, BotInfo::new(name, operator, purpose, renders_js))
        },
    ))
});

impl BotRegistry {
    /// Build a registry from `(pattern, info)` pairs in match order
    ///
    /// Entries with invalid patterns are skipped with a warning.
    pub fn with_entries<P, I>(entries: I) -> Self
    where
        P: AsRef<str>,
        I: IntoIterator<Item = (P, BotInfo)>,
    {
        let entries = entries
            .into_iter()
            .filter_map(|(pattern, info)| {
                Matcher::compile(pattern.as_ref()).map(|matcher| BotEntry { matcher, info })
            })
            .collect();
        Self { entries }
    }

    /// The built-in registry
    pub fn default_registry() -> &'static BotRegistry {
        &DEFAULT_REGISTRY
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered bots in match order
    pub fn bots(&self) -> impl Iterator<Item = &BotInfo> {
        self.entries.iter().map(|entry| &entry.info)
    }

    /// First registry entry matching the User-Agent
    pub fn identify(&self, user_agent: &str) -> Option<&BotInfo> {
        if user_agent.is_empty() {
            return None;
        }
        let lowered = user_agent.to_lowercase();
        self.entries
            .iter()
            .find(|entry| entry.matcher.is_match(user_agent, &lowered))
            .map(|entry| &entry.info)
    }

    /// Classify a request by its User-Agent and Accept headers
    ///
    /// Never fails; missing headers classify as a non-bot with no format
    /// preference.
    pub fn classify(&self, user_agent: Option<&str>, accept: Option<&str>) -> AgentClassification {
        let bot = user_agent.and_then(|ua| self.identify(ua)).cloned();
        AgentClassification {
            is_ai_bot: bot.is_some(),
            bot,
            wants_alternate_format: wants_markdown(accept),
        }
    }
}

impl Default for BotRegistry {
    fn default() -> Self {
        DEFAULT_REGISTRY.clone()
    }
}

/// Whether an Accept header asks for `text/markdown`
pub fn wants_markdown(accept: Option<&str>) -> bool {
    accept.is_some_and(|accept| accept.to_ascii_lowercase().contains("text/markdown"))
}

/// Classify against the built-in registry
pub fn classify(user_agent: Option<&str>, accept: Option<&str>) -> AgentClassification {
    DEFAULT_REGISTRY.classify(user_agent, accept)
}

/// `is_ai_bot || wants_alternate_format` against the built-in registry
pub fn should_serve_alternate(user_agent: Option<&str>, accept: Option<&str>) -> bool {
    classify(user_agent, accept).should_serve_alternate()
}
