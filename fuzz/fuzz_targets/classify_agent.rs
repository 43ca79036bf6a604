#![no_main]

use agent_seo_core::{classify, should_serve_alternate};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (Option<String>, Option<String>)| {
    let (user_agent, accept) = input;
    let classification = classify(user_agent.as_deref(), accept.as_deref());

    assert_eq!(classification.is_ai_bot, classification.bot.is_some());
    assert_eq!(
        should_serve_alternate(user_agent.as_deref(), accept.as_deref()),
        classification.should_serve_alternate()
    );
});
