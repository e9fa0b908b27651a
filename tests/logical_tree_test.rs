//! Integration tests for logical tree construction and memoization.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use quarrel::backend::{MemoryBackend, ScoredDoc, SearchBackend, SearchOptions};
use quarrel::cache::MemoryCache;
use quarrel::error::Result;
use quarrel::logical::{TreeEvaluator, new_seen_table};
use quarrel::query::{QueryNode, fields};

/// Counts backend executions so memoization is observable.
#[derive(Debug)]
struct CountingBackend {
    inner: MemoryBackend,
    executions: AtomicUsize,
}

impl CountingBackend {
    fn new(inner: MemoryBackend) -> Self {
        CountingBackend {
            inner,
            executions: AtomicUsize::new(0),
        }
    }

    fn executions(&self) -> usize {
        self.executions.load(Ordering::SeqCst)
    }
}

impl SearchBackend for CountingBackend {
    fn execute(&self, query: &QueryNode, options: &SearchOptions) -> Result<Vec<ScoredDoc>> {
        self.executions.fetch_add(1, Ordering::SeqCst);
        self.inner.execute(query, options)
    }

    fn retrieval_size(&self, query: &QueryNode) -> Result<u64> {
        self.inner.retrieval_size(query)
    }

    fn term_frequency(&self, field: &str, term: &str) -> Result<u64> {
        self.inner.term_frequency(field, term)
    }

    fn document_frequency(&self, field: &str, term: &str) -> Result<u64> {
        self.inner.document_frequency(field, term)
    }

    fn inverse_document_frequency(&self, field: &str, term: &str) -> Result<f64> {
        self.inner.inverse_document_frequency(field, term)
    }

    fn vocabulary_size(&self) -> Result<u64> {
        self.inner.vocabulary_size()
    }
}

fn sample_backend() -> MemoryBackend {
    let backend = MemoryBackend::new();
    backend.add_document("doc1", fields::TITLE, "aspirin");
    backend.add_document("doc2", fields::TITLE, "aspirin warfarin");
    backend.add_document("doc3", fields::TITLE, "aspirin warfarin heparin");
    backend.add_document("doc4", fields::TITLE, "warfarin heparin");
    backend
}

#[test]
fn test_combine_semantics_end_to_end() {
    let evaluator = TreeEvaluator::new(Arc::new(sample_backend()), Arc::new(MemoryCache::new()));

    // aspirin: doc1-3; warfarin: doc2-4.
    let and = QueryNode::and(vec![
        QueryNode::keyword("aspirin"),
        QueryNode::keyword("warfarin"),
    ]);
    let tree = evaluator.evaluate(&and).unwrap();
    assert_eq!(tree.retrieved_count(), 2);
    assert!(tree.docs().contains("doc2") && tree.docs().contains("doc3"));

    let or = QueryNode::or(vec![
        QueryNode::keyword("aspirin"),
        QueryNode::keyword("warfarin"),
    ]);
    let tree = evaluator.evaluate(&or).unwrap();
    assert_eq!(tree.retrieved_count(), 4);

    let not = QueryNode::not(vec![
        QueryNode::keyword("aspirin"),
        QueryNode::keyword("warfarin"),
    ]);
    let tree = evaluator.evaluate(&not).unwrap();
    assert_eq!(tree.retrieved_count(), 1);
    assert!(tree.docs().contains("doc1"));
}

#[test]
fn test_nway_and_is_true_intersection() {
    let evaluator = TreeEvaluator::new(Arc::new(sample_backend()), Arc::new(MemoryCache::new()));

    let query = QueryNode::and(vec![
        QueryNode::keyword("aspirin"),
        QueryNode::keyword("warfarin"),
        QueryNode::keyword("heparin"),
    ]);
    let tree = evaluator.evaluate(&query).unwrap();

    // Only doc3 contains all three terms, even though each adjacent pair
    // shares more documents.
    assert_eq!(tree.retrieved_count(), 1);
    assert!(tree.docs().contains("doc3"));
}

#[test]
fn test_shared_subtrees_execute_once_across_candidates() {
    let backend = Arc::new(CountingBackend::new(sample_backend()));
    let seen = new_seen_table();
    let cache = Arc::new(MemoryCache::new());

    // Two evaluators sharing one seen table, as in a selection round that
    // resolves many candidate trees.
    let first = TreeEvaluator::new(
        Arc::clone(&backend) as Arc<dyn SearchBackend>,
        Arc::clone(&cache) as _,
    )
    .with_seen_table(Arc::clone(&seen));
    let second = TreeEvaluator::new(
        Arc::clone(&backend) as Arc<dyn SearchBackend>,
        Arc::clone(&cache) as _,
    )
    .with_seen_table(seen);

    first
        .evaluate(&QueryNode::and(vec![
            QueryNode::keyword("aspirin"),
            QueryNode::keyword("warfarin"),
        ]))
        .unwrap();
    second
        .evaluate(&QueryNode::or(vec![
            QueryNode::keyword("aspirin"),
            QueryNode::keyword("heparin"),
        ]))
        .unwrap();

    // aspirin, warfarin, heparin: three distinct leaves, three executions.
    assert_eq!(backend.executions(), 3);
}

#[test]
fn test_adjacency_subtree_is_one_execution() {
    let backend = Arc::new(CountingBackend::new(sample_backend()));
    let evaluator = TreeEvaluator::new(
        Arc::clone(&backend) as Arc<dyn SearchBackend>,
        Arc::new(MemoryCache::new()),
    );

    let query = QueryNode::adj(
        1,
        vec![
            QueryNode::keyword("aspirin"),
            QueryNode::keyword("warfarin"),
        ],
    );
    let tree = evaluator.evaluate(&query).unwrap();

    // The whole ADJ clause went to the backend verbatim.
    assert_eq!(backend.executions(), 1);
    assert_eq!(tree.retrieved_count(), 2);
}
