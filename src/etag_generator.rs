//! ETag generation for text alternates using BLAKE3
//!
//! 1. Hash the rendered text bytes with BLAKE3
//! 2. Keep the first 128 bits (16 bytes)
//! 3. Hex encode and wrap in double quotes (RFC 9110 strong validator)
//!
//! Identical text always produces the same tag, so a cached transform and a
//! fresh transform of the same page validate against each other.
//!
//! # Example
//!
//! ```
//! use agent_seo_core::etag_generator::ETagGenerator;
//!
//! let generator = ETagGenerator::new();
//! let etag = generator.generate(b"# Hello World\n\nThis is a test.");
//!
//! assert!(etag.starts_with('"') && etag.ends_with('"'));
//! assert_eq!(etag.len(), 34);
//! assert!(generator.matches(Some(&etag), &etag));
//! ```

/// ETag generator using BLAKE3 hash
#[derive(Debug, Clone, Copy, Default)]
pub struct ETagGenerator;

impl ETagGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Strong ETag for the given bytes
    ///
    /// # Arguments
    ///
    /// * `content` - Rendered response bytes
    ///
    /// # Returns
    ///
    /// Quoted 32 character hex string
    pub fn generate(&self, content: &[u8]) -> String {
        let hash = blake3::hash(content);
        format!("\"{}\"", hex::encode(&hash.as_bytes()[..16]))
    }

    /// Strong ETag for rendered text
    pub fn for_text(&self, text: &str) -> String {
        self.generate(text.as_bytes())
    }

    /// Whether an `If-None-Match` header value matches `etag`
    ///
    /// Handles `*`, comma-separated lists and weak (`W/`) forms, using weak
    /// comparison as required for `If-None-Match`.
    pub fn matches(&self, if_none_match: Option<&str>, etag: &str) -> bool {
        let Some(header) = if_none_match else {
            return false;
        };
        let etag = strip_weak(etag.trim());
        header.split(',').map(str::trim).any(|candidate| {
            candidate == "*" || (!candidate.is_empty() && strip_weak(candidate) == etag)
        })
    }
}

fn strip_weak(tag: &str) -> &str {
    tag.strip_prefix("W/").unwrap_or(tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_etag_format() {
        let etag = ETagGenerator::new().generate(b"test content");
        assert!(etag.starts_with('"'));
        assert!(etag.ends_with('"'));
        assert_eq!(etag.len(), 34);
        assert!(etag[1..33].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_etag_uniqueness() {
        let generator = ETagGenerator::new();
        assert_ne!(generator.generate(b"content 1"), generator.generate(b"content 2"));
    }

    #[test]
    fn test_empty_and_unicode_content() {
        let generator = ETagGenerator::new();
        assert_eq!(generator.generate(b"").len(), 34);
        assert_eq!(generator.for_text("Hello 世界 🌍").len(), 34);
        assert_eq!(generator.for_text("abc"), generator.generate(b"abc"));
    }

    #[test]
    fn test_if_none_match() {
        let generator = ETagGenerator::new();
        let etag = generator.for_text("# Page");

        assert!(generator.matches(Some(&etag), &etag));
        assert!(generator.matches(Some(&format!("W/{}", etag)), &etag));
        assert!(generator.matches(Some(&format!("\"other\", {}", etag)), &etag));
        assert!(generator.matches(Some("*"), &etag));
        assert!(!generator.matches(Some("\"other\""), &etag));
        assert!(!generator.matches(Some(""), &etag));
        assert!(!generator.matches(None, &etag));
    }

    proptest! {
        #[test]
        fn prop_etag_consistency_for_identical_input(text in "\\PC{0,512}") {
            let generator = ETagGenerator::new();
            let etag1 = generator.for_text(&text);
            let etag2 = ETagGenerator.for_text(&text);

            prop_assert_eq!(&etag1, &etag2);
            prop_assert_eq!(etag1.len(), 34);
            prop_assert!(generator.matches(Some(&etag1), &etag2));
        }
    }
}
