//! Classify request agents and show the negotiated response

use agent_seo_core::{BotRegistry, classify};

fn main() {
    tracing_subscriber::fmt::init();

    println!("=== Agent Classification ===\n");

    let requests = [
        (Some("Mozilla/5.0 AppleWebKit/537.36 (KHTML, like Gecko; compatible; GPTBot/1.2; +https://openai.com/gptbot)"), None),
        (Some("Mozilla/5.0 (compatible; ClaudeBot/1.0; +claudebot@anthropic.com)"), None),
        (Some("Mozilla/5.0 (compatible; PerplexityBot/1.0)"), None),
        (Some("Mozilla/5.0 (Windows NT 10.0; Win64; x64) Chrome/120.0 Safari/537.36"), Some("text/html")),
        (Some("curl/8.4.0"), Some("text/markdown")),
        (None, None),
    ];

    for (user_agent, accept) in requests {
        let classification = classify(user_agent, accept);
        let bot = classification
            .bot
            .as_ref()
            .map(|bot| format!("{} ({}, {:?})", bot.name, bot.operator, bot.purpose))
            .unwrap_or_else(|| "-".to_string());

        println!("User-Agent: {}", user_agent.unwrap_or("<none>"));
        println!("Accept:     {}", accept.unwrap_or("<none>"));
        println!("  bot:       {}", bot);
        println!(
            "  serve:     {}\n",
            if classification.should_serve_alternate() {
                "text alternate"
            } else {
                "html"
            }
        );
    }

    println!("Registry holds {} crawlers", BotRegistry::default_registry().len());
}
