//! Character encoding detection and decoding for byte-level HTML input
//!
//! Upstream responses reach the pipeline as raw bytes. The encoding is
//! resolved in order of authority:
//!
//! 1. the `charset` parameter of the response Content-Type
//! 2. an early `<meta charset>` or `<meta http-equiv="Content-Type">` declaration
//! 3. UTF-8
//!
//! # Examples
//!
//! ```rust
//! use agent_seo_core::charset::{decode_html_lossy, detect_charset};
//!
//! assert_eq!(detect_charset(Some("text/html; charset=ISO-8859-1"), b""), "ISO-8859-1");
//! assert_eq!(detect_charset(None, b"<meta charset=\"utf-8\">"), "UTF-8");
//!
//! let text = decode_html_lossy(b"caf\xE9", Some("text/html; charset=windows-1252"));
//! assert_eq!(text, "café");
//! ```

use std::borrow::Cow;
use std::sync::LazyLock;

use encoding_rs::Encoding;
use regex::Regex;
use tracing::debug;

use crate::error::{AgentSeoError, Result};

/// Charset assumed when nothing is declared
const DEFAULT_CHARSET: &str = "UTF-8";

/// Meta declarations are only honored within this prefix of the document
const META_SCAN_LIMIT: usize = 1024;

static CONTENT_TYPE_CHARSET: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"(?i)charset\s*=\s*"?([^";,\s]+)"?"#).ok());

static META_CHARSET: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"(?i)<meta\s+charset\s*=\s*["']?([^"';>\s/]+)"#).ok());

static META_HTTP_EQUIV: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)<meta\s+http-equiv\s*=\s*["']?content-type["']?\s+content\s*=\s*["']?[^"'>]*charset\s*=\s*([^"';>\s]+)"#,
    )
    .ok()
});

/// Resolve the character encoding of an HTML body
///
/// Always returns a charset name, upper-cased, defaulting to `UTF-8`.
pub fn detect_charset(content_type: Option<&str>, html: &[u8]) -> String {
    if let Some(charset) = content_type.and_then(charset_from_content_type) {
        return charset.to_uppercase();
    }

    if let Some(charset) = charset_from_meta(html) {
        return charset.to_uppercase();
    }

    DEFAULT_CHARSET.to_string()
}

/// Read the `charset` parameter of a Content-Type value
pub fn charset_from_content_type(content_type: &str) -> Option<String> {
    let regex = CONTENT_TYPE_CHARSET.as_ref()?;
    regex
        .captures(content_type)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Scan the head of a document for a meta charset declaration
pub fn charset_from_meta(html: &[u8]) -> Option<String> {
    let prefix = &html[..html.len().min(META_SCAN_LIMIT)];
    let text = String::from_utf8_lossy(prefix);

    [&*META_CHARSET, &*META_HTTP_EQUIV]
        .into_iter()
        .flatten()
        .find_map(|regex| {
            regex
                .captures(&text)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
        })
}

/// Decode an HTML body strictly
///
/// Fails when the declared charset is unknown or the bytes are not valid in
/// that charset.
pub fn decode_html<'a>(html: &'a [u8], content_type: Option<&str>) -> Result<Cow<'a, str>> {
    let charset = detect_charset(content_type, html);

    if charset == DEFAULT_CHARSET {
        return std::str::from_utf8(html).map(Cow::Borrowed).map_err(|e| {
            AgentSeoError::Encoding(format!(
                "Invalid UTF-8 at byte position {}: {}",
                e.valid_up_to(),
                e
            ))
        });
    }

    let encoding = Encoding::for_label(charset.as_bytes()).ok_or_else(|| {
        AgentSeoError::Encoding(format!("Unsupported charset '{}'", charset))
    })?;

    encoding
        .decode_without_bom_handling_and_without_replacement(html)
        .ok_or_else(|| {
            AgentSeoError::Encoding(format!("Invalid byte sequence for charset '{}'", charset))
        })
}

/// Decode an HTML body, replacing anything undecodable
///
/// The transform pipeline never fails on encoding, so this is the entry
/// point used for upstream bodies.
pub fn decode_html_lossy<'a>(html: &'a [u8], content_type: Option<&str>) -> Cow<'a, str> {
    match decode_html(html, content_type) {
        Ok(text) => text,
        Err(err) => {
            debug!(error = %err, "falling back to lossy decoding");
            let charset = detect_charset(content_type, html);
            match Encoding::for_label(charset.as_bytes()) {
                Some(encoding) => encoding.decode_without_bom_handling(html).0,
                None => String::from_utf8_lossy(html),
            }
        }
    }
}
