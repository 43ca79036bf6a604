#![no_main]

use agent_seo_core::extract::BodyOnlyReader;
use agent_seo_core::{TransformOptions, Transformer, estimate_tokens};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let (budget, html) = match data.split_first() {
        Some((first, rest)) => (u32::from(*first), rest),
        None => (0, data),
    };
    let options = TransformOptions {
        token_budget: Some(budget),
        url: Some("https://example.com/fuzz".to_string()),
        ..Default::default()
    };
    let transformer = Transformer::with_reader(Box::new(BodyOnlyReader));
    let result = transformer.transform_bytes(html, Some("text/html"), &options);

    assert!(result.token_estimate <= budget);
    assert_eq!(result.token_estimate, estimate_tokens(&result.text));
});
