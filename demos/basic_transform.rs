//! Transform an HTML page into agent-facing Markdown
//!
//! Run with `RUST_LOG=debug` to see pipeline decisions.

use agent_seo_core::{TransformOptions, transform};
use tracing_subscriber::EnvFilter;

const PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <title>Deploying the Service</title>
  <meta name="description" content="Ship the service to production">
  <link rel="canonical" href="https://example.com/guides/deploy">
  <script type="application/ld+json">
    {"@type": "HowTo", "author": "Operations Team", "datePublished": "2024-03-01"}
  </script>
</head>
<body>
  <nav><a href="/">Home</a> | <a href="/guides">Guides</a></nav>
  <article>
    <h1>Deploying the Service</h1>
    <p>Build a release binary and copy it to the host. See the <a href="/guides/config">configuration guide</a>.</p>
    <h2>Steps</h2>
    <ol>
      <li>Build with <code>cargo build --release</code></li>
      <li>Copy the binary</li>
      <li>Restart the unit</li>
    </ol>
    <pre><code class="language-bash">systemctl restart service</code></pre>
    <table>
      <tr><th>Environment</th><th>Hosts</th></tr>
      <tr><td>staging</td><td>2</td></tr>
      <tr><td>production</td><td>8</td></tr>
    </table>
  </article>
  <div class="newsletter">Subscribe for updates</div>
  <footer>Copyright 2024</footer>
</body>
</html>"#;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let options = TransformOptions {
        url: Some("https://example.com/guides/deploy".to_string()),
        ..Default::default()
    };
    let result = transform(PAGE, &options);

    println!("=== Transform ===\n");
    println!("title:          {}", result.title);
    println!("description:    {}", result.description);
    println!("canonical:      {:?}", result.canonical_url);
    println!("lang:           {:?}", result.lang);
    println!("json-ld blocks: {}", result.structured_data.len());
    println!("tokens:         {}\n", result.token_estimate);
    println!("{}", result.text);
}
