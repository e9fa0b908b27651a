//! Single-edit query transformations and the generation engine.

pub mod adjacency;
pub mod candidate;
pub mod context;
pub mod engine;
pub mod expansion;
pub mod keyword_ops;
pub mod logical_ops;

use std::fmt::Debug;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use adjacency::{AdjacencyRange, AdjacencyReplacement};
pub use candidate::{CandidateQuery, ChainLink};
pub use context::{ClauseType, TransformationContext};
pub use engine::{TransformationEngine, TransformationEngineConfig};
pub use expansion::{ConceptExpansion, SimilarityProvider, StaticSimilarity};
pub use keyword_ops::{FieldRestrictions, MeshExplosion};
pub use logical_ops::{ClauseRemoval, LogicalOperatorReplacement};

use crate::error::Result;
use crate::query::QueryNode;

/// Categorical identity of an edit operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransformationId {
    LogicalOperatorReplacement,
    AdjacencyRange,
    AdjacencyReplacement,
    MeshExplosion,
    FieldRestrictions,
    ClauseRemoval,
    ConceptExpansion,
}

impl TransformationId {
    /// Stable operator name.
    pub fn name(&self) -> &'static str {
        match self {
            TransformationId::LogicalOperatorReplacement => "logical_operator_replacement",
            TransformationId::AdjacencyRange => "adjacency_range",
            TransformationId::AdjacencyReplacement => "adjacency_replacement",
            TransformationId::MeshExplosion => "mesh_explosion",
            TransformationId::FieldRestrictions => "field_restrictions",
            TransformationId::ClauseRemoval => "clause_removal",
            TransformationId::ConceptExpansion => "concept_expansion",
        }
    }

    /// Stable ordinal used as the categorical feature value. Starts at 1;
    /// 0 is reserved for the unmodified baseline.
    pub fn ordinal(&self) -> u32 {
        match self {
            TransformationId::LogicalOperatorReplacement => 1,
            TransformationId::AdjacencyRange => 2,
            TransformationId::AdjacencyReplacement => 3,
            TransformationId::MeshExplosion => 4,
            TransformationId::FieldRestrictions => 5,
            TransformationId::ClauseRemoval => 6,
            TransformationId::ConceptExpansion => 7,
        }
    }
}

/// An edit operator: given a node, produce zero or more single-edit
/// alternatives. Stateless per call.
pub trait Transformer: Send + Sync + Debug {
    /// The operator's categorical identity.
    fn id(&self) -> TransformationId;

    /// The operator's name.
    fn name(&self) -> &'static str {
        self.id().name()
    }

    /// Alternatives for one node. Inapplicable nodes yield an empty list.
    fn apply(&self, node: &QueryNode) -> Result<Vec<QueryNode>>;
}

/// The full operator catalog over a similarity provider.
pub fn default_transformers(
    provider: Arc<dyn SimilarityProvider>,
    similarity_threshold: f64,
) -> Vec<Arc<dyn Transformer>> {
    vec![
        Arc::new(LogicalOperatorReplacement),
        Arc::new(AdjacencyRange),
        Arc::new(AdjacencyReplacement),
        Arc::new(MeshExplosion),
        Arc::new(FieldRestrictions),
        Arc::new(ClauseRemoval),
        Arc::new(ConceptExpansion::new(provider, similarity_threshold)),
    ]
}
