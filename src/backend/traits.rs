//! Backend capability contract consumed by the evaluator and measurements.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::query::QueryNode;

/// A document retrieved for one atomic (sub)query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDoc {
    /// Backend document identifier.
    pub doc_id: String,
    /// Retrieval score.
    pub score: f32,
}

impl ScoredDoc {
    /// Create a scored document.
    pub fn new<S: Into<String>>(doc_id: S, score: f32) -> Self {
        ScoredDoc {
            doc_id: doc_id.into(),
            score,
        }
    }
}

/// Options for a single backend execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Maximum number of documents to return.
    pub max_docs: usize,
    /// Identifier tying executions to one refinement run.
    pub run_id: String,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            max_docs: 10_000,
            run_id: uuid::Uuid::new_v4().to_string(),
        }
    }
}

impl SearchOptions {
    /// Create options with the given result cap and a fresh run id.
    pub fn new(max_docs: usize) -> Self {
        SearchOptions {
            max_docs,
            ..Default::default()
        }
    }

    /// Set the run identifier.
    pub fn with_run_id<S: Into<String>>(mut self, run_id: S) -> Self {
        self.run_id = run_id.into();
        self
    }
}

/// A document-retrieval backend.
///
/// Implementations wrap a concrete search service (an index, a remote
/// API). The evaluator only relies on this contract; swapping backends
/// never changes callers.
pub trait SearchBackend: Send + Sync + Debug {
    /// Execute a query and return its ranked results.
    fn execute(&self, query: &QueryNode, options: &SearchOptions) -> Result<Vec<ScoredDoc>>;

    /// Number of documents the query retrieves, ignoring any result cap.
    fn retrieval_size(&self, query: &QueryNode) -> Result<u64>;

    /// Total occurrences of a term in a field across the collection.
    fn term_frequency(&self, field: &str, term: &str) -> Result<u64>;

    /// Number of documents containing a term in a field.
    fn document_frequency(&self, field: &str, term: &str) -> Result<u64>;

    /// Inverse document frequency of a term in a field.
    fn inverse_document_frequency(&self, field: &str, term: &str) -> Result<f64>;

    /// Number of distinct terms in the collection.
    fn vocabulary_size(&self) -> Result<u64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_options_builder() {
        let options = SearchOptions::new(50).with_run_id("run-1");

        assert_eq!(options.max_docs, 50);
        assert_eq!(options.run_id, "run-1");
    }

    #[test]
    fn test_default_run_id_is_unique() {
        let a = SearchOptions::default();
        let b = SearchOptions::default();
        assert_ne!(a.run_id, b.run_id);
    }

    #[test]
    fn test_scored_doc() {
        let doc = ScoredDoc::new("pmid:123", 2.5);
        assert_eq!(doc.doc_id, "pmid:123");
        assert_eq!(doc.score, 2.5);
    }
}
