//! Main content extraction
//!
//! Article-like pages go through a reader-mode extractor; everything else
//! (documentation indexes, reference pages, landing pages) keeps its full
//! body markup so legitimate content is not discarded.

use markup5ever_rcdom::RcDom;
use readabilityrs::{Readability, ReadabilityOptions, is_probably_readerable};
use tracing::debug;

use crate::dom;

/// Reader-mode service
///
/// `looks_extractable` is the cheap pre-flight predicate; `extract` runs the
/// full heuristic and returns the main content markup, or `None` when it
/// finds nothing usable.
pub trait ReaderMode: Send + Sync {
    fn looks_extractable(&self, html: &str) -> bool;

    fn extract(&self, html: &str, url: Option<&str>) -> Option<String>;
}

/// Reader mode backed by `readabilityrs`
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadabilityReader;

impl ReaderMode for ReadabilityReader {
    fn looks_extractable(&self, html: &str) -> bool {
        is_probably_readerable(html, None)
    }

    fn extract(&self, html: &str, url: Option<&str>) -> Option<String> {
        let options = ReadabilityOptions::builder()
            .char_threshold(100)
            .build();

        let readability = match Readability::new(html, url, Some(options)) {
            Ok(readability) => readability,
            Err(err) => {
                debug!(error = %err, "reader mode unavailable for document");
                return None;
            }
        };

        let article = readability.parse()?;
        let content: Option<String> = article.content.into();
        content.filter(|markup| !markup.trim().is_empty())
    }
}

/// Reader mode that never extracts, so the body markup is always used
#[derive(Debug, Clone, Copy, Default)]
pub struct BodyOnlyReader;

impl ReaderMode for BodyOnlyReader {
    fn looks_extractable(&self, _html: &str) -> bool {
        false
    }

    fn extract(&self, _html: &str, _url: Option<&str>) -> Option<String> {
        None
    }
}

/// Select the main content markup of a document
///
/// # Arguments
///
/// * `reader` - Reader-mode service
/// * `html` - Original document source
/// * `dom` - The parsed document, used for the body fallback
/// * `url` - Document URL, passed to the reader for link resolution
///
/// # Returns
///
/// The extracted article markup when the page looks extractable and the
/// reader finds content, otherwise the body's inner HTML. If the document
/// has no body, the original source is returned.
pub fn extract_main_content(
    reader: &dyn ReaderMode,
    html: &str,
    dom: &RcDom,
    url: Option<&str>,
) -> String {
    if reader.looks_extractable(html) {
        if let Some(content) = reader.extract(html, url) {
            debug!(chars = content.len(), "using reader mode content");
            return content;
        }
        debug!("reader mode found nothing, falling back to body");
    }

    match dom::find_first(&dom.document, "body") {
        Some(body) => dom::inner_html(&body),
        None => html.to_string(),
    }
}
