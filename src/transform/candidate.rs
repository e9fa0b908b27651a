//! Candidate queries and their edit chains.

use serde::{Deserialize, Serialize};

use crate::features::FeatureSet;
use crate::query::{Fingerprint, QueryNode};
use crate::transform::TransformationId;

/// One adopted edit in a candidate's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainLink {
    /// The operator that produced the step.
    pub transformation: TransformationId,
    /// The query after the step.
    pub query: QueryNode,
}

/// A single-edit variant of a query, with its provenance and features.
///
/// The chain records the ordered history of edits from the seed query to
/// this candidate and is append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateQuery {
    /// The operator that produced this candidate; `None` for seeds and
    /// unmodified baselines.
    pub transformation: Option<TransformationId>,
    /// Topic this candidate belongs to.
    pub topic: String,
    /// The candidate's query.
    pub query: QueryNode,
    /// Ordered edit history from the seed.
    pub chain: Vec<ChainLink>,
    /// The candidate's feature vector.
    pub features: FeatureSet,
}

impl CandidateQuery {
    /// Create a seed candidate with an empty chain.
    pub fn seed<S: Into<String>>(topic: S, query: QueryNode) -> Self {
        CandidateQuery {
            transformation: None,
            topic: topic.into(),
            query,
            chain: Vec::new(),
            features: FeatureSet::new(),
        }
    }

    /// Create a candidate derived from a parent by one edit.
    pub fn derived(
        parent: &CandidateQuery,
        transformation: TransformationId,
        query: QueryNode,
        features: FeatureSet,
    ) -> Self {
        let mut chain = parent.chain.clone();
        chain.push(ChainLink {
            transformation,
            query: query.clone(),
        });
        CandidateQuery {
            transformation: Some(transformation),
            topic: parent.topic.clone(),
            query,
            chain,
            features,
        }
    }

    /// Create an unmodified baseline of a parent (no edit, same chain).
    pub fn baseline(parent: &CandidateQuery, features: FeatureSet) -> Self {
        CandidateQuery {
            transformation: None,
            topic: parent.topic.clone(),
            query: parent.query.clone(),
            chain: parent.chain.clone(),
            features,
        }
    }

    /// Fingerprint of the candidate's query.
    pub fn fingerprint(&self) -> Fingerprint {
        self.query.fingerprint()
    }

    /// Number of edits from the seed.
    pub fn depth(&self) -> usize {
        self.chain.len()
    }
}
