//! Criterion benchmarks for the Sagitta hybrid search engine.
//!
//! Covers the two CPU-bound kernels:
//! - BM25 index build and search
//! - Reciprocal Rank Fusion

use std::hint::black_box;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};

use sagitta::document::{Document, SearchResult};
use sagitta::fusion::rrf::{DEFAULT_RRF_K, rrf_fuse};
use sagitta::lexical::{Bm25Config, Bm25Index};

/// Generate test documents for benchmarking.
fn generate_test_documents(count: usize) -> Vec<Document> {
    let words = [
        "users", "billing", "invoices", "webhooks", "pagination", "cursor", "token", "request",
        "response", "endpoint", "status", "error", "limit", "create", "update", "delete", "list",
        "retrieve", "search", "filter", "header", "body", "json", "authentication", "customer",
    ];

    (0..count)
        .map(|i| {
            let content: Vec<&str> = (0..30).map(|j| words[(i * 7 + j * 3) % words.len()]).collect();
            Document::new(format!("doc_{i}"), content.join(" "))
        })
        .collect()
}

fn generate_ranking(count: usize, offset: usize) -> Vec<SearchResult> {
    (0..count)
        .map(|i| {
            let id = format!("doc_{}", (i + offset) % (count * 2));
            SearchResult::new(Document::new(id, "content"), 1.0 / (i + 1) as f32)
        })
        .collect()
}

fn bench_bm25_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("bm25_build");
    for size in [100, 1_000] {
        let documents = generate_test_documents(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(format!("{size}_docs"), |b| {
            b.iter(|| Bm25Index::build(black_box(&documents), Bm25Config::default()));
        });
    }
    group.finish();
}

fn bench_bm25_search(c: &mut Criterion) {
    let documents = generate_test_documents(1_000);
    let index = Bm25Index::build(&documents, Bm25Config::default());

    c.bench_function("bm25_search_1000_docs", |b| {
        b.iter(|| index.search(black_box("list users pagination cursor"), black_box(20)));
    });
}

fn bench_rrf_fuse(c: &mut Criterion) {
    let mut group = c.benchmark_group("rrf_fuse");
    for size in [20, 200] {
        let lexical = generate_ranking(size, 0);
        let vector = generate_ranking(size, size / 2);
        group.throughput(Throughput::Elements(size as u64 * 2));
        group.bench_function(format!("{size}_per_list"), |b| {
            b.iter(|| {
                rrf_fuse(
                    black_box(vec![lexical.clone(), vector.clone()]),
                    DEFAULT_RRF_K,
                    10,
                )
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_bm25_build, bench_bm25_search, bench_rrf_fuse);
criterion_main!(benches);
