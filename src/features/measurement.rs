//! Measurement contract and the built-in structural measurements.

use std::fmt::Debug;
use std::sync::Arc;

use crate::backend::SearchBackend;
use crate::error::Result;
use crate::query::{Operator, QueryNode};

/// A named scalar function of a query, optionally using backend
/// statistics. Consumed as a black box when building feature vectors.
pub trait Measurement: Send + Sync + Debug {
    /// Stable measurement name, used as the feature name.
    fn name(&self) -> &str;

    /// Measure a query.
    fn measure(&self, query: &QueryNode, backend: &dyn SearchBackend) -> Result<f64>;
}

/// Number of keyword leaves.
#[derive(Debug, Default)]
pub struct KeywordCount;

impl Measurement for KeywordCount {
    fn name(&self) -> &str {
        "keyword_count"
    }

    fn measure(&self, query: &QueryNode, _backend: &dyn SearchBackend) -> Result<f64> {
        Ok(query.keyword_count() as f64)
    }
}

/// Number of boolean clauses.
#[derive(Debug, Default)]
pub struct ClauseCount;

impl Measurement for ClauseCount {
    fn name(&self) -> &str {
        "clause_count"
    }

    fn measure(&self, query: &QueryNode, _backend: &dyn SearchBackend) -> Result<f64> {
        Ok(query.clause_count() as f64)
    }
}

/// Maximum tree depth.
#[derive(Debug, Default)]
pub struct MaxDepth;

impl Measurement for MaxDepth {
    fn name(&self) -> &str {
        "max_depth"
    }

    fn measure(&self, query: &QueryNode, _backend: &dyn SearchBackend) -> Result<f64> {
        Ok(query.max_depth() as f64)
    }
}

/// Count of clauses carrying one boolean operator.
#[derive(Debug)]
pub struct BooleanOperatorCount {
    operator: Operator,
    name: String,
}

impl BooleanOperatorCount {
    /// Create a counter for one operator.
    pub fn new(operator: Operator) -> Self {
        let name = format!("{}_count", operator.label().to_lowercase());
        BooleanOperatorCount { operator, name }
    }
}

impl Measurement for BooleanOperatorCount {
    fn name(&self) -> &str {
        &self.name
    }

    fn measure(&self, query: &QueryNode, _backend: &dyn SearchBackend) -> Result<f64> {
        Ok(query.operator_count(self.operator) as f64)
    }
}

/// Number of documents the backend retrieves for the query.
#[derive(Debug, Default)]
pub struct RetrievalSize;

impl Measurement for RetrievalSize {
    fn name(&self) -> &str {
        "retrieval_size"
    }

    fn measure(&self, query: &QueryNode, backend: &dyn SearchBackend) -> Result<f64> {
        Ok(backend.retrieval_size(query)? as f64)
    }
}

/// Mean inverse document frequency over the query's keyword tokens.
#[derive(Debug, Default)]
pub struct MeanIdf;

impl MeanIdf {
    fn collect(query: &QueryNode, backend: &dyn SearchBackend, acc: &mut Vec<f64>) -> Result<()> {
        match query {
            QueryNode::Keyword(k) => {
                for field in &k.fields {
                    for token in k.text.to_lowercase().split_whitespace() {
                        acc.push(backend.inverse_document_frequency(field, token)?);
                    }
                }
                Ok(())
            }
            QueryNode::Boolean(b) => {
                for child in &b.children {
                    Self::collect(child, backend, acc)?;
                }
                Ok(())
            }
        }
    }
}

impl Measurement for MeanIdf {
    fn name(&self) -> &str {
        "mean_idf"
    }

    fn measure(&self, query: &QueryNode, backend: &dyn SearchBackend) -> Result<f64> {
        let mut values = Vec::new();
        Self::collect(query, backend, &mut values)?;
        if values.is_empty() {
            return Ok(0.0);
        }
        Ok(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// The default measurement stack used when assembling an engine.
pub fn default_measurements() -> Vec<Arc<dyn Measurement>> {
    vec![
        Arc::new(KeywordCount),
        Arc::new(ClauseCount),
        Arc::new(MaxDepth),
        Arc::new(BooleanOperatorCount::new(Operator::And)),
        Arc::new(BooleanOperatorCount::new(Operator::Or)),
        Arc::new(BooleanOperatorCount::new(Operator::Not)),
        Arc::new(RetrievalSize),
        Arc::new(MeanIdf),
    ]
}
