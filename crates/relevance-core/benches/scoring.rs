//! Benchmarks for the CPU-side scoring steps.
//!
//! Run with: cargo bench -p relevance-core

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use relevance_core::link::html::extract_page_text;
use relevance_core::math::cosine_similarity;
use relevance_core::pipeline::Attachments;
use relevance_core::RelevanceCombinator;

/// Deterministic pseudo-embedding of MiniLM's dimension.
fn embedding(seed: u32) -> Vec<f32> {
    (0..384)
        .map(|i| ((i as u32).wrapping_mul(2654435761).wrapping_add(seed) % 1000) as f32 / 1000.0 - 0.5)
        .collect()
}

fn benchmark_cosine(c: &mut Criterion) {
    let a = embedding(1);
    let b = embedding(2);

    c.bench_function("cosine_similarity_384", |bench| {
        bench.iter(|| cosine_similarity(black_box(&a), black_box(&b)))
    });
}

fn benchmark_combine(c: &mut Criterion) {
    let text = embedding(3);
    let images: [f32; 3] = [0.3, 0.9, 0.1];
    let links: [f32; 1] = [0.5];
    let combinator = RelevanceCombinator::default();

    c.bench_function("combine_zero_fill", |bench| {
        bench.iter(|| combinator.combine(black_box(&text), black_box(&images), black_box(&links)))
    });

    c.bench_function("combine_no_attachments", |bench| {
        bench.iter(|| combinator.combine(black_box(&text), &[], &[]))
    });
}

fn benchmark_html_extraction(c: &mut Criterion) {
    let paragraphs: String = (0..200)
        .map(|i| format!("<p>Paragraph {i} about layout issues in the settings sidebar.</p>\n"))
        .collect();
    let html = format!(
        "<html><head><title>Layout</title><meta name=\"description\" content=\"UI bugs\">\
         <script>var x = 1;</script><style>p {{ margin: 0 }}</style></head>\
         <body>{paragraphs}</body></html>"
    );

    c.bench_function("extract_page_text_200_paragraphs", |bench| {
        bench.iter(|| extract_page_text(black_box(&html), 500))
    });
}

fn benchmark_attachments(c: &mut Criterion) {
    let body = "Fixed the sidebar.\n\n![before](https://example.com/before.png) \
                ![after](https://github.com/user-attachments/assets/abc)\n\
                See [the issue](https://example.com/issues/12) and https://example.com/docs/layout.\n\
                <img src=\"https://example.com/extra.jpg\"> <a href=\"https://example.com/pr/3\">PR</a>";

    c.bench_function("attachments_extract", |bench| {
        bench.iter(|| Attachments::extract(black_box(body)))
    });
}

criterion_group!(
    benches,
    benchmark_cosine,
    benchmark_combine,
    benchmark_html_extraction,
    benchmark_attachments,
);
criterion_main!(benches);
