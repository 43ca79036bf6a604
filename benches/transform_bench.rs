//! Benchmarks for the transform pipeline and agent classification.

use std::hint::black_box;

use agent_seo_core::extract::BodyOnlyReader;
use agent_seo_core::{TransformOptions, Transformer, classify, estimate_tokens, sanitize};
use criterion::{Criterion, criterion_group, criterion_main};

fn sample_page(sections: usize) -> String {
    let mut body = String::from("<header><nav><a href=\"/\">Home</a><a href=\"/docs\">Docs</a></nav></header><main>");
    for i in 0..sections {
        body.push_str(&format!(
            "<h2>Section {i}</h2><p>Paragraph {i} with <a href=\"/ref/{i}\">a link</a> and <code>inline()</code> code.</p>\
             <ul><li>First</li><li>Second</li></ul><pre><code class=\"language-rust\">fn f{i}() {{}}</code></pre>"
        ));
    }
    body.push_str("</main><footer>Footer</footer>");
    format!("<html lang=\"en\"><head><title>Bench</title></head><body>{body}</body></html>")
}

fn transform_benchmark(c: &mut Criterion) {
    let transformer = Transformer::with_reader(Box::new(BodyOnlyReader));
    let options = TransformOptions {
        url: Some("https://example.com/bench".to_string()),
        ..Default::default()
    };
    let small = sample_page(5);
    let large = sample_page(200);

    c.bench_function("transform_small", |b| {
        b.iter(|| transformer.transform(black_box(&small), &options))
    });
    c.bench_function("transform_large", |b| {
        b.iter(|| transformer.transform(black_box(&large), &options))
    });
    c.bench_function("sanitize_large", |b| b.iter(|| sanitize(black_box(&large))));
    c.bench_function("estimate_tokens", |b| b.iter(|| estimate_tokens(black_box(&large))));
}

fn classify_benchmark(c: &mut Criterion) {
    c.bench_function("classify_bot", |b| {
        b.iter(|| classify(black_box(Some("Mozilla/5.0 (compatible; PerplexityBot/1.0)")), None))
    });
    c.bench_function("classify_browser", |b| {
        b.iter(|| {
            classify(
                black_box(Some("Mozilla/5.0 (X11; Linux x86_64) Chrome/120.0 Safari/537.36")),
                Some("text/html"),
            )
        })
    });
}

criterion_group!(benches, transform_benchmark, classify_benchmark);
criterion_main!(benches);
