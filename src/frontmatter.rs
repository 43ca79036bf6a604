//! YAML-style frontmatter block prefixed to transformed documents
//!
//! The block opens and closes with a `---` line and carries one
//! `key: "value"` line per field that has a value:
//!
//! ```text
//! ---
//! title: "Getting Started"
//! description: "Install and configure the toolkit"
//! url: "https://example.com/docs/start"
//! lang: "en"
//! schema: "TechArticle"
//! author: "Ada Lovelace"
//! ---
//! ```

use serde_json::Value;

/// Frontmatter delimiter line
pub const DELIMITER: &str = "---";

/// Values gathered from the page for the frontmatter block
#[derive(Debug, Clone, Copy, Default)]
pub struct FrontmatterInput<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub url: Option<&'a str>,
    pub lang: Option<&'a str>,
    pub last_modified: Option<&'a str>,
    pub structured_data: &'a [Value],
}

/// Build the frontmatter block
///
/// The result starts and ends with [`DELIMITER`] and has no trailing
/// newline. Empty values are left out rather than written as `""`.
///
/// # Examples
///
/// ```rust
/// use agent_seo_core::frontmatter::{build_frontmatter, FrontmatterInput};
///
/// let block = build_frontmatter(&FrontmatterInput {
///     title: "Test Page",
///     lang: Some("en"),
///     ..Default::default()
/// });
/// assert_eq!(block, "---\ntitle: \"Test Page\"\nlang: \"en\"\n---");
/// ```
pub fn build_frontmatter(input: &FrontmatterInput<'_>) -> String {
    let mut output = String::new();
    output.push_str(DELIMITER);
    output.push('\n');

    write_field(&mut output, "title", Some(input.title));
    write_field(&mut output, "description", Some(input.description));
    write_field(&mut output, "url", input.url);
    write_field(&mut output, "lang", input.lang);
    write_field(&mut output, "lastModified", input.last_modified);

    if let Some(primary) = input.structured_data.first() {
        write_field(&mut output, "schema", schema_type(primary));
        write_field(&mut output, "author", author_name(primary));
        write_field(
            &mut output,
            "datePublished",
            primary.get("datePublished").and_then(Value::as_str),
        );
        write_field(
            &mut output,
            "dateModified",
            primary.get("dateModified").and_then(Value::as_str),
        );
    }

    output.push_str(DELIMITER);
    output
}

fn write_field(output: &mut String, key: &str, value: Option<&str>) {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return;
    };
    output.push_str(key);
    output.push_str(": \"");
    output.push_str(&escape_yaml(value));
    output.push_str("\"\n");
}

/// Escape a value for a double-quoted YAML scalar on a single line
fn escape_yaml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    let mut last_was_break = false;

    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\r' | '\n' => {
                if !last_was_break {
                    escaped.push(' ');
                }
                last_was_break = true;
                continue;
            }
            c if c.is_control() => escaped.push(' '),
            c => escaped.push(c),
        }
        last_was_break = false;
    }

    escaped
}

/// `@type` of an entry, or the first type when it is a list
fn schema_type(entry: &Value) -> Option<&str> {
    match entry.get("@type")? {
        Value::String(kind) => Some(kind.as_str()),
        Value::Array(kinds) => kinds.first().and_then(Value::as_str),
        _ => None,
    }
}

/// Author as a plain string, a `Person` object, or the first of a list
fn author_name(entry: &Value) -> Option<&str> {
    fn name_of(author: &Value) -> Option<&str> {
        match author {
            Value::String(name) => Some(name.as_str()),
            Value::Object(person) => person.get("name").and_then(Value::as_str),
            _ => None,
        }
    }

    match entry.get("author")? {
        Value::Array(authors) => authors.first().and_then(name_of),
        author => name_of(author),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_minimal_block() {
        let block = build_frontmatter(&FrontmatterInput {
            title: "Hello",
            ..Default::default()
        });
        assert_eq!(block, "---\ntitle: \"Hello\"\n---");
    }

    #[test]
    fn test_empty_fields_are_omitted() {
        let block = build_frontmatter(&FrontmatterInput::default());
        assert_eq!(block, "---\n---");

        let block = build_frontmatter(&FrontmatterInput {
            title: "T",
            url: Some(""),
            lang: Some("   "),
            ..Default::default()
        });
        assert!(!block.contains("url:"));
        assert!(!block.contains("lang:"));
    }

    #[test]
    fn test_field_order() {
        let data = vec![json!({"@type": "Article"})];
        let block = build_frontmatter(&FrontmatterInput {
            title: "T",
            description: "D",
            url: Some("https://example.com/a"),
            lang: Some("en"),
            last_modified: Some("2024-05-01"),
            structured_data: &data,
        });
        assert_eq!(
            block,
            "---\n\
             title: \"T\"\n\
             description: \"D\"\n\
             url: \"https://example.com/a\"\n\
             lang: \"en\"\n\
             lastModified: \"2024-05-01\"\n\
             schema: \"Article\"\n\
             ---"
        );
    }

    #[test]
    fn test_quotes_and_newlines_escaped() {
        let block = build_frontmatter(&FrontmatterInput {
            title: "Say \"hi\"",
            description: "line one\nline two\r\nline three",
            ..Default::default()
        });
        assert!(block.contains("title: \"Say \\\"hi\\\"\""));
        assert!(block.contains("description: \"line one line two line three\""));
    }

    #[test]
    fn test_schema_type_list_uses_first() {
        let data = vec![json!({"@type": ["NewsArticle", "Article"]})];
        let block = build_frontmatter(&FrontmatterInput {
            title: "T",
            structured_data: &data,
            ..Default::default()
        });
        assert!(block.contains("schema: \"NewsArticle\""));
    }

    #[test]
    fn test_author_and_dates_from_first_entry() {
        let data = vec![
            json!({
                "@type": "BlogPosting",
                "author": {"@type": "Person", "name": "Ada Lovelace"},
                "datePublished": "2024-01-02",
                "dateModified": "2024-02-03"
            }),
            json!({"@type": "Organization", "author": "Ignored"}),
        ];
        let block = build_frontmatter(&FrontmatterInput {
            title: "T",
            structured_data: &data,
            ..Default::default()
        });
        assert!(block.contains("author: \"Ada Lovelace\""));
        assert!(block.contains("datePublished: \"2024-01-02\""));
        assert!(block.contains("dateModified: \"2024-02-03\""));
        assert!(!block.contains("Ignored"));
    }

    #[test]
    fn test_author_list_and_string_forms() {
        let list = vec![json!({"author": [{"name": "First"}, {"name": "Second"}]})];
        let block = build_frontmatter(&FrontmatterInput {
            structured_data: &list,
            ..Default::default()
        });
        assert!(block.contains("author: \"First\""));

        let plain = vec![json!({"author": "Plain Name"})];
        let block = build_frontmatter(&FrontmatterInput {
            structured_data: &plain,
            ..Default::default()
        });
        assert!(block.contains("author: \"Plain Name\""));
        assert!(!block.contains("schema:"));
    }

    proptest! {
        #[test]
        fn prop_block_shape(title in "\\PC{0,40}", description in "\\PC{0,40}") {
            let block = build_frontmatter(&FrontmatterInput {
                title: &title,
                description: &description,
                ..Default::default()
            });
            let lines: Vec<&str> = block.lines().collect();
            prop_assert_eq!(lines.first().copied(), Some(DELIMITER));
            prop_assert_eq!(lines.last().copied(), Some(DELIMITER));
            prop_assert!(lines.len() >= 2);
            for line in &lines[1..lines.len() - 1] {
                let (key, value) = line.split_once(": ").expect("key: value line");
                prop_assert!(!key.is_empty());
                prop_assert!(value.starts_with('"') && value.ends_with('"'));
            }
        }
    }
}
