//! Criterion benchmarks for queryshape-core.
//!
//! ## Benchmark groups
//!
//! 1. **normalize** — literal erasure on small and wide filter documents.
//! 2. **doc_hash** — structural hashing of normalized documents.
//! 3. **detector** — `get_query_hash` on a warm cache, single and contended.
//!
//! ## Running
//!
//! ```sh
//! cargo bench --manifest-path crates/queryshape-core/Cargo.toml
//! # Run only the detector group:
//! cargo bench --manifest-path crates/queryshape-core/Cargo.toml -- detector
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use _queryshape_core::shape::hash::calculate_doc_hash;
use _queryshape_core::shape::normalize::normalize_map;
use _queryshape_core::{QueryShapeDetector, Value};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const SMALL_QUERY: &str = r#"{"status": "ACTIVE", "age": {"$in": [1, 2, 3]}}"#;

/// A filter with `width` top-level fields, each an operator document.
fn wide_query(width: usize) -> Value {
    Value::document((0..width).map(|i| {
        (
            format!("field_{i}"),
            Value::document([
                ("$gte", Value::from(i as i64)),
                ("$nin", Value::array([1, 2, 3])),
            ]),
        )
    }))
}

fn parse(text: &str) -> Value {
    Value::from_json_str(text).expect("bench fixture must parse")
}

// ---------------------------------------------------------------------------
// Groups
// ---------------------------------------------------------------------------

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");
    let small = parse(SMALL_QUERY);
    group.bench_function("small", |b| {
        b.iter(|| normalize_map(black_box(small.as_document()), false))
    });
    for width in [8usize, 64, 256] {
        let query = wide_query(width);
        group.bench_with_input(BenchmarkId::new("wide", width), &query, |b, query| {
            b.iter(|| normalize_map(black_box(query.as_document()), false))
        });
    }
    group.finish();
}

fn bench_doc_hash(c: &mut Criterion) {
    let mut group = c.benchmark_group("doc_hash");
    for width in [8usize, 64, 256] {
        let normalized = normalize_map(wide_query(width).as_document(), false);
        group.bench_with_input(BenchmarkId::new("wide", width), &normalized, |b, doc| {
            b.iter(|| calculate_doc_hash(black_box(Some(doc))))
        });
    }
    group.finish();
}

fn bench_detector(c: &mut Criterion) {
    let mut group = c.benchmark_group("detector");
    let detector = QueryShapeDetector::new();
    let query = parse(SMALL_QUERY);
    let sort = parse(r#"{"createdAt": -1, "name": 1}"#);
    detector.get_query_hash("users", Some(&query), Some(&sort));

    group.bench_function("warm_hit", |b| {
        b.iter(|| detector.get_query_hash(black_box("users"), Some(&query), Some(&sort)))
    });

    group.bench_function("contended_4_threads", |b| {
        b.iter(|| {
            std::thread::scope(|scope| {
                for _ in 0..4 {
                    scope.spawn(|| {
                        for _ in 0..64 {
                            black_box(detector.get_query_hash("users", Some(&query), Some(&sort)));
                        }
                    });
                }
            })
        })
    });
    group.finish();
}

criterion_group!(benches, bench_normalize, bench_doc_hash, bench_detector);
criterion_main!(benches);
