//! Concept expansion over a term-similarity service.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use crate::error::Result;
use crate::query::{Keyword, QueryNode};
use crate::transform::{TransformationId, Transformer};

/// Upper bound on expansion terms per keyword.
const MAX_EXPANSIONS: usize = 5;

/// A source of semantically similar terms with similarity scores.
///
/// Backed by an external service in production; [`StaticSimilarity`]
/// provides an in-memory table for tests.
pub trait SimilarityProvider: Send + Sync + Debug {
    /// Similar terms for a term, each with a similarity in `[0, 1]`,
    /// most similar first.
    fn similar_terms(&self, term: &str) -> Result<Vec<(String, f64)>>;
}

/// In-memory similarity table.
#[derive(Debug, Default)]
pub struct StaticSimilarity {
    table: HashMap<String, Vec<(String, f64)>>,
}

impl StaticSimilarity {
    /// Create an empty table.
    pub fn new() -> Self {
        StaticSimilarity::default()
    }

    /// Register similar terms for a term.
    pub fn insert<S: Into<String>>(&mut self, term: S, similar: Vec<(&str, f64)>) {
        self.table.insert(
            term.into().to_lowercase(),
            similar
                .into_iter()
                .map(|(t, s)| (t.to_string(), s))
                .collect(),
        );
    }
}

impl SimilarityProvider for StaticSimilarity {
    fn similar_terms(&self, term: &str) -> Result<Vec<(String, f64)>> {
        Ok(self
            .table
            .get(&term.to_lowercase())
            .cloned()
            .unwrap_or_default())
    }
}

/// Expands a keyword into an OR of itself and its most similar terms.
#[derive(Debug)]
pub struct ConceptExpansion {
    provider: Arc<dyn SimilarityProvider>,
    threshold: f64,
}

impl ConceptExpansion {
    /// Create an expansion operator over a provider. Terms below
    /// `threshold` are ignored.
    pub fn new(provider: Arc<dyn SimilarityProvider>, threshold: f64) -> Self {
        ConceptExpansion {
            provider,
            threshold,
        }
    }
}

impl Transformer for ConceptExpansion {
    fn id(&self) -> TransformationId {
        TransformationId::ConceptExpansion
    }

    fn apply(&self, node: &QueryNode) -> Result<Vec<QueryNode>> {
        let keyword = match node {
            QueryNode::Keyword(k) => k,
            QueryNode::Boolean(_) => return Ok(Vec::new()),
        };

        let similar = self.provider.similar_terms(&keyword.text)?;
        let expansions: Vec<Keyword> = similar
            .into_iter()
            .filter(|(_, score)| *score >= self.threshold)
            .take(MAX_EXPANSIONS)
            .map(|(term, _)| {
                let mut expanded = keyword.clone();
                expanded.text = term;
                expanded
            })
            .collect();

        if expansions.is_empty() {
            return Ok(Vec::new());
        }

        let mut children = vec![QueryNode::Keyword(keyword.clone())];
        children.extend(expansions.into_iter().map(QueryNode::Keyword));
        Ok(vec![QueryNode::or(children)])
    }
}
