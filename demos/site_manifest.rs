//! Generate llms.txt and llms-full.txt for a small site
//!
//! Pass a page directory to discover routes from it instead of the built-in list:
//! `cargo run --example site_manifest -- path/to/app`

use std::collections::HashMap;
use std::env;
use std::path::Path;

use agent_seo_core::{
    DiscoverOptions, ManifestOptions, ManifestRoute, discover_app_routes, generate_manifest,
};
use tracing_subscriber::EnvFilter;

fn main() -> agent_seo_core::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let routes = match env::args().nth(1) {
        Some(dir) => discover_app_routes(Path::new(&dir), &DiscoverOptions::default())?,
        None => vec![
            ManifestRoute::new("/", "Home").with_description("Product overview"),
            ManifestRoute::new("/docs/intro", "Introduction").with_section("Documentation"),
            ManifestRoute::new("/docs/install", "Installation")
                .with_section("Documentation")
                .with_description("Install on Linux and macOS"),
            ManifestRoute::new("/blog/launch", "Launch Post").with_section("Blog"),
        ],
    };

    let options = ManifestOptions {
        site_name: "My App".to_string(),
        site_description: "A great application.".to_string(),
        base_url: "https://example.com".to_string(),
        ..Default::default()
    };

    let full_text: HashMap<String, String> = routes
        .iter()
        .map(|route| (route.path.clone(), format!("# {}\n\nPage body.", route.title)))
        .collect();

    let manifest = generate_manifest(&options, &routes, Some(&full_text));

    println!("=== /llms.txt ({} routes) ===\n", manifest.route_count);
    println!("{}", manifest.summary);
    println!("=== /llms-full.txt ===\n");
    println!("{}", manifest.full);
    Ok(())
}
