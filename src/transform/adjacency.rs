//! Edits over adjacency clauses.

use crate::error::Result;
use crate::query::{BooleanNode, Operator, QueryNode};
use crate::transform::{TransformationId, Transformer};

/// Widens and narrows the window of an ADJ*n* clause.
#[derive(Debug, Default)]
pub struct AdjacencyRange;

impl Transformer for AdjacencyRange {
    fn id(&self) -> TransformationId {
        TransformationId::AdjacencyRange
    }

    fn apply(&self, node: &QueryNode) -> Result<Vec<QueryNode>> {
        let clause = match node {
            QueryNode::Boolean(b) => b,
            QueryNode::Keyword(_) => return Ok(Vec::new()),
        };
        let n = match clause.operator {
            Operator::Adj(n) => n,
            _ => return Ok(Vec::new()),
        };

        let mut variants = vec![QueryNode::Boolean(BooleanNode::new(
            Operator::Adj(n + 1),
            clause.children.clone(),
        ))];
        if n > 1 {
            variants.push(QueryNode::Boolean(BooleanNode::new(
                Operator::Adj(n - 1),
                clause.children.clone(),
            )));
        }
        Ok(variants)
    }
}

/// Relaxes an ADJ*n* clause into a plain AND.
#[derive(Debug, Default)]
pub struct AdjacencyReplacement;

impl Transformer for AdjacencyReplacement {
    fn id(&self) -> TransformationId {
        TransformationId::AdjacencyReplacement
    }

    fn apply(&self, node: &QueryNode) -> Result<Vec<QueryNode>> {
        let clause = match node {
            QueryNode::Boolean(b) => b,
            QueryNode::Keyword(_) => return Ok(Vec::new()),
        };
        if !clause.operator.is_adjacency() {
            return Ok(Vec::new());
        }

        Ok(vec![QueryNode::Boolean(BooleanNode::new(
            Operator::And,
            clause.children.clone(),
        ))])
    }
}
