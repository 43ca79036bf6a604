//! Show how the token budget truncates long pages

use agent_seo_core::extract::BodyOnlyReader;
use agent_seo_core::{TransformOptions, Transformer, estimate_tokens};

fn long_page() -> String {
    let mut body = String::new();
    for chapter in 1..=6 {
        body.push_str(&format!("<h2>Chapter {chapter}</h2>"));
        for paragraph in 1..=3 {
            body.push_str(&format!(
                "<p>Chapter {chapter}, paragraph {paragraph}. The quick brown fox jumps over the lazy dog.</p>"
            ));
        }
    }
    format!("<html><head><title>Long Read</title></head><body><main><h1>Long Read</h1>{body}</main></body></html>")
}

fn main() {
    tracing_subscriber::fmt::init();

    let html = long_page();
    let transformer = Transformer::with_reader(Box::new(BodyOnlyReader));

    let unbounded = transformer.transform(&html, &TransformOptions::default());
    println!("=== Token Budget ===\n");
    println!("Full text: {} tokens\n", unbounded.token_estimate);

    for budget in [200, 100, 40, 0] {
        let options = TransformOptions {
            token_budget: Some(budget),
            ..Default::default()
        };
        let result = transformer.transform(&html, &options);
        assert_eq!(result.token_estimate, estimate_tokens(&result.text));

        println!("--- budget {budget}: {} tokens ---", result.token_estimate);
        println!("{}\n", result.text);
    }
}
