//! Classification, manifest, cache and request handling tests

use agent_seo_core::classifier::wants_markdown;
use agent_seo_core::extract::BodyOnlyReader;
use agent_seo_core::{
    AgentSeo, AgentSeoConfig, BotPurpose, CacheOptions, ManifestOptions, ManifestRoute,
    RequestPlan, TransformCache, TransformResult, Transformer, classify, generate_manifest,
    should_serve_alternate,
};
use proptest::prelude::*;

fn site_options() -> ManifestOptions {
    ManifestOptions {
        site_name: "My App".to_string(),
        site_description: "A great application.".to_string(),
        base_url: "https://example.com".to_string(),
        ..Default::default()
    }
}

#[test]
fn test_gptbot_scenario() {
    let classification = classify(Some("Mozilla/5.0 GPTBot/1.0"), None);
    assert!(classification.is_ai_bot);
    let bot = classification.bot.expect("GPTBot is registered");
    assert_eq!(bot.name, "GPTBot");
    assert_eq!(bot.operator, "OpenAI");
    assert_eq!(bot.purpose, BotPurpose::Training);
}

#[test]
fn test_browser_scenario() {
    let classification = classify(Some("Mozilla/5.0 Chrome/120.0"), None);
    assert!(!classification.is_ai_bot);
    assert!(classification.bot.is_none());

    for user_agent in [None, Some("")] {
        let classification = classify(user_agent, None);
        assert!(!classification.is_ai_bot);
        assert!(classification.bot.is_none());
    }
}

#[test]
fn test_classification_serializes_with_wire_names() {
    let value = serde_json::to_value(classify(Some("ClaudeBot/1.0"), Some("text/markdown"))).unwrap();
    assert_eq!(value["isAIBot"], true);
    assert_eq!(value["wantsAlternateFormat"], true);
    assert_eq!(value["bot"]["operator"], "Anthropic");
}

#[test]
fn test_manifest_scenario() {
    let routes = [ManifestRoute::new("/docs/intro", "Introduction").with_section("Documentation")];
    let manifest = generate_manifest(&site_options(), &routes, None);

    assert!(manifest.summary.contains("# My App"));
    assert!(manifest.summary.contains("> A great application."));
    assert!(manifest.summary.contains("## Documentation"));
    assert!(manifest.summary.contains("[Introduction](https://example.com/docs/intro.md)"));
    assert_eq!(manifest.route_count, 1);
}

#[test]
fn test_manifest_sections_keep_first_occurrence_order() {
    let routes = [
        ManifestRoute::new("/zeta", "Zeta").with_section("Zoo"),
        ManifestRoute::new("/alpha", "Alpha").with_section("Animals"),
        ManifestRoute::new("/zeta/2", "Zeta 2").with_section("Zoo"),
        ManifestRoute::new("/misc", "Misc"),
    ];
    let summary = generate_manifest(&site_options(), &routes, None).summary;

    let zoo = summary.find("## Zoo").unwrap();
    let animals = summary.find("## Animals").unwrap();
    let pages = summary.find("## Pages").unwrap();
    assert!(zoo < animals && animals < pages);
    assert!(summary.find("[Zeta 2]").unwrap() < animals);
}

#[test]
fn test_empty_manifest_is_valid() {
    let manifest = generate_manifest(&site_options(), &[], None);
    assert_eq!(manifest.summary, "# My App\n\n> A great application.\n");
    assert_eq!(manifest.route_count, 0);
}

#[test]
fn test_cache_scenario() {
    let cache: TransformCache = TransformCache::new(CacheOptions {
        max_entries: 2,
        ttl_ms: 60_000,
    });
    for key in ["a", "b", "c"] {
        cache.set(key, TransformResult::default());
    }
    assert_eq!(cache.size(), 2);
    assert!(!cache.has("a"));
    assert!(cache.has("b"));
    assert!(cache.has("c"));

    cache.clear();
    assert_eq!(cache.size(), 0);
}

fn service() -> AgentSeo {
    let mut config = AgentSeoConfig::new("My App", "A great application.", "https://example.com");
    config.manifest.routes = vec![
        ManifestRoute::new("/docs/intro", "Introduction").with_section("Documentation"),
    ];
    AgentSeo::new(config)
        .unwrap()
        .with_transformer(Transformer::with_reader(Box::new(BodyOnlyReader)))
}

const INTRO_PAGE: &[u8] = b"<html><head><title>Introduction</title></head><body><main><h1>Intro</h1><p>Welcome aboard.</p></main></body></html>";

#[test]
fn test_bot_request_flow() {
    let seo = service();

    let plan = seo.plan("/docs/intro", Some("Mozilla/5.0 (compatible; GPTBot/1.0)"), None);
    let RequestPlan::ServeAlternate { path, explicit, .. } = plan else {
        panic!("expected an alternate");
    };
    assert_eq!(path, "/docs/intro");
    assert!(!explicit);

    let response = seo.render_alternate(&path, INTRO_PAGE, Some("text/html; charset=utf-8"));
    assert!(response.transformed);
    assert_eq!(response.header("content-type"), Some("text/markdown; charset=utf-8"));
    assert_eq!(response.header("Vary"), Some("Accept, User-Agent"));
    let text = String::from_utf8(response.body.clone()).unwrap();
    assert!(text.contains("url: \"https://example.com/docs/intro\""));
    assert!(text.contains("# Intro"));

    let etag = response.header("ETag").unwrap().to_string();
    assert!(response.is_not_modified(Some(&etag)));

    let full = seo.manifest(true);
    let full_text = String::from_utf8(full.body).unwrap();
    assert!(full_text.contains("Welcome aboard."));
}

#[test]
fn test_browser_request_gets_link_header() {
    let seo = service();
    let plan = seo.plan("/docs/", Some("Mozilla/5.0 Chrome/120.0"), Some("text/html"));
    let RequestPlan::PassThrough { headers } = plan else {
        panic!("expected pass-through");
    };
    assert!(headers.contains(&(
        "Link",
        "</docs/index.md>; rel=\"alternate\"; type=\"text/markdown\"".to_string()
    )));
}

#[test]
fn test_explicit_and_manifest_paths() {
    let seo = service();
    assert_eq!(seo.plan("/llms.txt", None, None), RequestPlan::Manifest { full: false });
    assert_eq!(seo.plan("/llms-full.txt", None, None), RequestPlan::Manifest { full: true });

    match seo.plan("/docs/intro.md", Some("curl/8.0"), None) {
        RequestPlan::ServeAlternate { path, explicit, .. } => {
            assert_eq!(path, "/docs/intro");
            assert!(explicit);
        }
        other => panic!("expected explicit alternate, got {other:?}"),
    }

    let summary = String::from_utf8(seo.manifest(false).body).unwrap();
    assert!(summary.starts_with("# My App"));
}

#[test]
fn test_excluded_path_passes_through() {
    let seo = service();
    let plan = seo.plan("/api/users", Some("GPTBot/1.0"), None);
    assert_eq!(
        plan,
        RequestPlan::PassThrough {
            headers: vec![("Vary", "Accept, User-Agent".to_string())]
        }
    );
}

proptest! {
    #[test]
    fn prop_serve_alternate_is_bot_or_markdown(
        user_agent in prop::option::of("[ -~]{0,60}"),
        accept in prop::option::of(prop::sample::select(vec![
            "text/html",
            "text/markdown",
            "text/html, text/markdown;q=0.9",
            "*/*",
            "",
        ])),
    ) {
        let classification = classify(user_agent.as_deref(), accept);
        let expected = classification.is_ai_bot || accept.is_some_and(|a| a.contains("text/markdown"));
        prop_assert_eq!(should_serve_alternate(user_agent.as_deref(), accept), expected);
        prop_assert_eq!(wants_markdown(accept), accept.is_some_and(|a| a.contains("text/markdown")));
    }

    #[test]
    fn prop_cache_never_exceeds_capacity(
        max in 1usize..8,
        keys in prop::collection::vec("[a-e]{1,2}", 0..40),
    ) {
        let cache: TransformCache = TransformCache::new(CacheOptions { max_entries: max, ttl_ms: 0 });
        for key in &keys {
            cache.set(key.as_str(), TransformResult::default());
            prop_assert!(cache.size() <= max);
        }
        if let Some(last) = keys.last() {
            prop_assert!(cache.has(last));
        }
    }
}
