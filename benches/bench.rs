//! Benchmarks for fingerprinting and set combination.

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use quarrel::backend::ScoredDoc;
use quarrel::logical::DocSet;
use quarrel::query::QueryNode;

fn deep_query(depth: usize) -> QueryNode {
    let mut node = QueryNode::or(vec![
        QueryNode::keyword("heparin"),
        QueryNode::keyword("warfarin"),
    ]);
    for i in 0..depth {
        node = QueryNode::and(vec![node, QueryNode::keyword(format!("term{i}"))]);
    }
    node
}

fn doc_set(offset: usize, len: usize) -> DocSet {
    DocSet::from_scored((offset..offset + len).map(|i| ScoredDoc::new(format!("doc{i}"), 1.0)))
}

fn bench_fingerprint(c: &mut Criterion) {
    let query = deep_query(32);
    c.bench_function("fingerprint_deep_query", |b| {
        b.iter(|| black_box(&query).fingerprint())
    });
}

fn bench_combine(c: &mut Criterion) {
    let a = doc_set(0, 10_000);
    let b_set = doc_set(5_000, 10_000);

    c.bench_function("intersect_10k", |b| {
        b.iter(|| DocSet::intersect_all(&[black_box(&a), black_box(&b_set)]))
    });
    c.bench_function("union_10k", |b| {
        b.iter(|| DocSet::union_all(&[black_box(&a), black_box(&b_set)]))
    });
    c.bench_function("complement_10k", |b| {
        b.iter(|| DocSet::complement(&[black_box(&a), black_box(&b_set)]))
    });
}

criterion_group!(benches, bench_fingerprint, bench_combine);
criterion_main!(benches);
