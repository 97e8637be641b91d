//! Benchmarks for the mdpage pipeline.
//!
//! Run with: cargo bench
//!
//! Each stage is measured on its own, then the whole parse, resolve,
//! render and export chain on documents of growing length.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mdpage::{parse, resolve, Exporter, StyleConfig};

/// Builds a resume-like document with `sections` experience entries.
fn create_test_markdown(sections: usize) -> String {
    let mut content = String::from(mdpage::SAMPLE_MARKDOWN);
    for i in 0..sections {
        content.push_str(&format!(
            "\n## Experience {}\n\n### ->{{#2563eb}}Role {}<- *(Company, 20{:02})*\n\
             **Company** | Remote | Jan - Dec\n\n\
             - Shipped feature {} with [details](https://example.com/{})\n\
             - ***Reduced*** latency by {}% across the {{teal}}platform\n\n---\n",
            i,
            i,
            i % 100,
            i,
            i,
            i % 90 + 10
        ));
    }
    content
}

/// Benchmark parsing at various sizes.
fn bench_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("parsing");

    for sections in [0, 10, 50].iter() {
        let source = create_test_markdown(*sections);

        group.bench_function(format!("{}_sections", sections), |b| {
            b.iter(|| parse(black_box(&source)));
        });
    }

    group.finish();
}

/// Benchmark style resolution.
fn bench_style_resolution(c: &mut Criterion) {
    let config = StyleConfig::default();
    c.bench_function("resolve_style", |b| {
        b.iter(|| resolve(black_box(&config)));
    });
}

/// Benchmark layout of a parsed document.
fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    let style = resolve(&StyleConfig::default());

    for sections in [0, 10, 50].iter() {
        let doc = parse(&create_test_markdown(*sections));

        group.bench_function(format!("{}_sections", sections), |b| {
            b.iter(|| mdpage::layout::render(black_box(&doc), &style));
        });
    }

    group.finish();
}

/// Benchmark the full pipeline including PDF assembly.
fn bench_full_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    let exporter = Exporter::new();

    for sections in [0, 10].iter() {
        let source = create_test_markdown(*sections);

        group.bench_function(format!("{}_sections", sections), |b| {
            b.iter(|| {
                let doc = parse(black_box(&source));
                let surface = mdpage::render_surface(&doc, &StyleConfig::default());
                let _ = exporter.export_to_bytes(&surface);
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_parsing,
    bench_style_resolution,
    bench_layout,
    bench_full_pipeline,
);
criterion_main!(benches);
