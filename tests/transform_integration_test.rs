//! End-to-end tests for the HTML to Markdown pipeline

use agent_seo_core::extract::BodyOnlyReader;
use agent_seo_core::frontmatter::{FrontmatterInput, build_frontmatter};
use agent_seo_core::sanitizer::sanitize_with;
use agent_seo_core::{
    RenderRule, SanitizeOptions, TransformOptions, Transformer, estimate_tokens, sanitize,
    transform, transform_bytes,
};
use proptest::prelude::*;
use serde_json::json;

const ARTICLE_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <title>Getting Started</title>
  <meta name="description" content="Install and configure the toolkit">
  <link rel="canonical" href="https://example.com/docs/start">
  <script type="application/ld+json">
    {"@type": "TechArticle", "author": {"@type": "Person", "name": "Ada Lovelace"}, "datePublished": "2024-01-15"}
  </script>
  <script type="application/ld+json">{ not json </script>
</head>
<body>
  <header><nav><a href="/">Home</a> <a href="/docs">Docs</a></nav></header>
  <main>
    <h1>Getting Started</h1>
    <p>Install the toolkit with the package manager and read the <a href="/docs/config">configuration guide</a>.</p>
    <pre><code class="language-bash">npm install toolkit</code></pre>
    <div class="cookie-banner">We use cookies</div>
  </main>
  <footer>Copyright 2024</footer>
</body>
</html>"#;

fn body_only() -> Transformer {
    Transformer::with_reader(Box::new(BodyOnlyReader))
}

#[test]
fn test_minimal_article_scenario() {
    let html = "<html><head><title>Test Page</title></head><body><article><h1>Hello</h1><p>World</p></article></body></html>";
    let result = transform(html, &TransformOptions::default());

    assert_eq!(result.title, "Test Page");
    assert!(result.text.starts_with("---\n"));
    assert!(result.text.contains("title: \"Test Page\""));
    assert!(result.text.lines().any(|line| line.starts_with("# ")));
    assert!(result.text.contains("World"));
    assert_eq!(result.token_estimate, estimate_tokens(&result.text));
}

#[test]
fn test_full_page_pipeline() {
    let options = TransformOptions {
        url: Some("https://example.com/docs/start".to_string()),
        ..Default::default()
    };
    let result = body_only().transform(ARTICLE_PAGE, &options);

    assert_eq!(result.title, "Getting Started");
    assert_eq!(result.description, "Install and configure the toolkit");
    assert_eq!(result.canonical_url.as_deref(), Some("https://example.com/docs/start"));
    assert_eq!(result.lang.as_deref(), Some("en"));
    // The malformed block is skipped
    assert_eq!(result.structured_data.len(), 1);
    assert_eq!(result.structured_data[0]["@type"], json!("TechArticle"));

    let text = &result.text;
    assert!(text.contains("schema: \"TechArticle\""));
    assert!(text.contains("author: \"Ada Lovelace\""));
    assert!(text.contains("url: \"https://example.com/docs/start\""));
    assert!(text.contains("# Getting Started"));
    assert!(text.contains("[configuration guide](https://example.com/docs/config)"));
    assert!(text.contains("```bash\nnpm install toolkit\n```"));
    assert!(!text.contains("We use cookies"));
    assert!(!text.contains("Copyright 2024"));
    assert!(!text.contains("[Home]"));
}

#[test]
fn test_frontmatter_disabled() {
    let options = TransformOptions {
        frontmatter: false,
        ..Default::default()
    };
    let result = body_only().transform(ARTICLE_PAGE, &options);
    assert!(!result.text.starts_with("---"));
    assert!(result.text.starts_with("# Getting Started"));
}

#[test]
fn test_degenerate_inputs_never_fail() {
    for html in ["", "   ", "<", "<html>", "<<<>>>", "<div><p>unclosed", "\u{0}\u{1}"] {
        let result = transform(html, &TransformOptions::default());
        assert_eq!(result.title, "", "{html:?}");
        assert_eq!(result.description, "", "{html:?}");
        assert_eq!(result.token_estimate, estimate_tokens(&result.text));
    }
}

#[test]
fn test_transform_bytes_uses_declared_charset() {
    let mut html = b"<html><head><title>Caf".to_vec();
    html.push(0xE9);
    html.extend_from_slice(b"</title></head><body><p>ok</p></body></html>");

    let result = transform_bytes(&html, Some("text/html; charset=ISO-8859-1"), &TransformOptions::default());
    assert_eq!(result.title, "Café");
}

#[test]
fn test_custom_render_rule_applies() {
    let rule = RenderRule::for_tags("highlight", &["mark"], |content, _node| {
        format!("=={}==", content.trim())
    });
    let options = TransformOptions {
        frontmatter: false,
        render_rules: vec![rule],
        ..Default::default()
    };
    let html = "<html><body><p>Mind the <mark>gap</mark> please.</p></body></html>";
    let result = body_only().transform(html, &options);
    assert!(result.text.contains("Mind the ==gap== please."), "{}", result.text);
}

#[test]
fn test_sanitize_scenario() {
    let output = sanitize("<nav>X</nav><p>Y</p>");
    assert!(output.contains('Y'));
    assert!(!output.contains('X'));
}

#[test]
fn test_preserve_overrides_strip() {
    let options = SanitizeOptions {
        preserve_selectors: vec![".keep".to_string()],
        ..Default::default()
    };
    let output = sanitize_with(r#"<nav class="keep">Table of contents</nav><p>Body</p>"#, &options);
    assert!(output.contains("Table of contents"));
    assert!(output.contains("Body"));
}

#[test]
fn test_frontmatter_shape() {
    let block = build_frontmatter(&FrontmatterInput {
        title: "Test Page",
        description: "About",
        url: Some("https://example.com/"),
        ..Default::default()
    });
    let lines: Vec<&str> = block.lines().collect();
    assert_eq!(lines.first(), Some(&"---"));
    assert_eq!(lines.last(), Some(&"---"));
    assert_eq!(
        &lines[1..lines.len() - 1],
        &[
            "title: \"Test Page\"",
            "description: \"About\"",
            "url: \"https://example.com/\""
        ]
    );
}

fn page_html(title: &str, paragraphs: &[String]) -> String {
    let body: String = paragraphs
        .iter()
        .enumerate()
        .map(|(i, p)| {
            if i % 3 == 0 {
                format!("<h2>Section {i}</h2><p>{p}</p>")
            } else {
                format!("<p>{p}</p>")
            }
        })
        .collect();
    format!("<html><head><title>{title}</title></head><body><main>{body}</main></body></html>")
}

proptest! {
    #[test]
    fn prop_token_budget_respected(
        title in "[A-Za-z ]{0,30}",
        paragraphs in prop::collection::vec("[A-Za-z0-9 .,]{0,200}", 0..12),
        budget in 0u32..300,
    ) {
        let html = page_html(&title, &paragraphs);
        let options = TransformOptions {
            token_budget: Some(budget),
            ..Default::default()
        };
        let result = body_only().transform(&html, &options);
        prop_assert!(result.token_estimate <= budget);
        prop_assert_eq!(result.token_estimate, estimate_tokens(&result.text));
    }

    #[test]
    fn prop_preserved_nodes_survive(
        word in "[A-Za-z]{4,12}",
        tag in prop::sample::select(vec!["nav", "footer", "aside", "header"]),
    ) {
        let options = SanitizeOptions {
            preserve_selectors: vec!["#keep".to_string()],
            ..Default::default()
        };
        let html = format!(r#"<{tag} id="keep">{word}</{tag}><p>body</p>"#);
        let output = sanitize_with(&html, &options);
        prop_assert!(output.contains(&word));
    }

    #[test]
    fn prop_transform_is_deterministic(paragraphs in prop::collection::vec("[a-z ]{1,60}", 1..6)) {
        let html = page_html("Stable", &paragraphs);
        let transformer = body_only();
        let first = transformer.transform(&html, &TransformOptions::default());
        let second = transformer.transform(&html, &TransformOptions::default());
        prop_assert_eq!(first, second);
    }
}
