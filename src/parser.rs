//! HTML5 parsing into an `RcDom` tree
//!
//! html5ever recovers from malformed markup the way browsers do, so
//! parsing a string never fails. Empty input still yields a document with
//! `<html>`, `<head>` and `<body>` elements.

use html5ever::parse_document as html5ever_parse;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::RcDom;

/// Parse an HTML string into a DOM tree
pub fn parse_document(html: &str) -> RcDom {
    html5ever_parse(RcDom::default(), Default::default()).one(html)
}
