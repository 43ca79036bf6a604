//! JSON-LD structured data extraction
//!
//! Every `<script type="application/ld+json">` block is parsed on its own.
//! Graph containers (`{"@graph": [...]}`) and top-level arrays are
//! flattened so each described entity becomes one entry. A block that
//! fails to parse is skipped without affecting the others.

use markup5ever_rcdom::RcDom;
use serde_json::Value;
use tracing::debug;

use crate::dom;

const JSON_LD_TYPE: &str = "application/ld+json";

/// Collect the structured data entries of a document in document order
///
/// # Examples
///
/// ```rust
/// use agent_seo_core::parser::parse_document;
/// use agent_seo_core::structured_data::extract_structured_data;
///
/// let dom = parse_document(r#"<script type="application/ld+json">{"@type":"Article"}</script>"#);
/// let entries = extract_structured_data(&dom);
/// assert_eq!(entries[0]["@type"], "Article");
/// ```
pub fn extract_structured_data(dom: &RcDom) -> Vec<Value> {
    let mut entries = Vec::new();

    for (index, script) in dom::find_all(&dom.document, "script").iter().enumerate() {
        let is_json_ld = dom::get_attr(script, "type")
            .is_some_and(|kind| kind.trim().eq_ignore_ascii_case(JSON_LD_TYPE));
        if !is_json_ld {
            continue;
        }

        let source = dom::text_content(script);
        match serde_json::from_str::<Value>(source.trim()) {
            Ok(value) => flatten_into(value, &mut entries),
            Err(err) => debug!(script = index, error = %err, "skipping malformed JSON-LD block"),
        }
    }

    entries
}

fn flatten_into(value: Value, entries: &mut Vec<Value>) {
    match value {
        Value::Array(items) => {
            entries.extend(items.into_iter().filter(Value::is_object));
        }
        Value::Object(mut object) => match object.remove("@graph") {
            Some(Value::Array(graph)) => {
                entries.extend(graph.into_iter().filter(Value::is_object));
            }
            Some(other) => {
                object.insert("@graph".to_string(), other);
                entries.push(Value::Object(object));
            }
            None => entries.push(Value::Object(object)),
        },
        _ => {}
    }
}
