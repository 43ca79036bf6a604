//! Token count estimation and budget truncation for LLM context windows
//!
//! The estimate is a character heuristic, not a tokenizer: one token per
//! four characters, rounded up. It is deliberately approximate and stable
//! across model families.

use std::borrow::Cow;

use tracing::debug;

/// Notice line appended when truncation stops at a heading
pub const TRUNCATION_NOTICE: &str = "*[Content truncated for token budget]*";

/// Default characters per token
pub const DEFAULT_CHARS_PER_TOKEN: usize = 4;

/// Character-based token estimator
///
/// # Examples
///
/// ```rust
/// use agent_seo_core::token_estimator::TokenEstimator;
///
/// let estimator = TokenEstimator::new();
/// assert_eq!(estimator.estimate(""), 0);
/// assert_eq!(estimator.estimate("12345"), 2);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TokenEstimator {
    chars_per_token: usize,
}

impl TokenEstimator {
    /// Create an estimator with the default ratio of 4 characters per token
    pub fn new() -> Self {
        Self {
            chars_per_token: DEFAULT_CHARS_PER_TOKEN,
        }
    }

    /// Create an estimator with a custom ratio
    ///
    /// A ratio of zero is treated as one.
    pub fn with_chars_per_token(chars_per_token: usize) -> Self {
        Self {
            chars_per_token: chars_per_token.max(1),
        }
    }

    /// Estimate tokens as `ceil(chars / chars_per_token)`
    ///
    /// Characters are Unicode scalar values, so multi-byte text is not
    /// over-counted.
    pub fn estimate(&self, text: &str) -> u32 {
        let tokens = text.chars().count().div_ceil(self.chars_per_token);
        u32::try_from(tokens).unwrap_or(u32::MAX)
    }

    /// Truncate `text` so that its estimate does not exceed `budget`
    ///
    /// Lines are accumulated in order, separators included, until the next
    /// line would exceed the budget. When that boundary line is a Markdown
    /// heading it is kept and followed by [`TRUNCATION_NOTICE`], giving back
    /// earlier lines as needed to stay within the budget. If even the heading
    /// and notice alone do not fit, the text stops before the boundary.
    ///
    /// Text that already fits is returned unchanged.
    pub fn truncate<'a>(&self, text: &'a str, budget: u32) -> Cow<'a, str> {
        if self.estimate(text) <= budget {
            return Cow::Borrowed(text);
        }

        let limit = (budget as usize).saturating_mul(self.chars_per_token);
        let mut kept_chars = 0usize;
        let mut kept_lines: Vec<&str> = Vec::new();
        let mut boundary = None;

        for line in text.split('\n') {
            let separator = usize::from(!kept_lines.is_empty());
            let added = line.chars().count() + separator;
            if kept_chars + added > limit {
                boundary = Some(line);
                break;
            }
            kept_chars += added;
            kept_lines.push(line);
        }

        let kept = kept_lines.join("\n");
        let kept = kept.trim_end();

        debug!(
            budget,
            kept_lines = kept_lines.len(),
            "truncated text to token budget"
        );

        if let Some(heading) = boundary.filter(|line| is_heading(line)) {
            // Give back trailing lines until the heading and notice fit
            let mut lines = kept_lines.clone();
            loop {
                let candidate = join_blocks(&[
                    lines.join("\n").trim_end(),
                    heading.trim_end(),
                    TRUNCATION_NOTICE,
                ]);
                if self.estimate(&candidate) <= budget {
                    return Cow::Owned(candidate);
                }
                if lines.pop().is_none() {
                    break;
                }
            }
        }

        Cow::Owned(kept.to_string())
    }
}

impl Default for TokenEstimator {
    fn default() -> Self {
        Self::new()
    }
}

/// Estimate tokens with the default estimator
pub fn estimate_tokens(text: &str) -> u32 {
    TokenEstimator::new().estimate(text)
}

/// Truncate text to a token budget with the default estimator
pub fn truncate_to_budget(text: &str, budget: u32) -> Cow<'_, str> {
    TokenEstimator::new().truncate(text, budget)
}

/// ATX heading: one to six `#` followed by whitespace
fn is_heading(line: &str) -> bool {
    let hashes = line.chars().take_while(|c| *c == '#').count();
    (1..=6).contains(&hashes) && line[hashes..].starts_with(char::is_whitespace)
}

/// Join non-empty blocks with a blank line between them
fn join_blocks(blocks: &[&str]) -> String {
    blocks
        .iter()
        .filter(|block| !block.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("\n\n")
}
