//! Edits over boolean clause structure.

use crate::error::Result;
use crate::query::{BooleanNode, Operator, QueryNode};
use crate::transform::{TransformationId, Transformer};

/// Replaces AND with OR and vice versa at a boolean clause.
#[derive(Debug, Default)]
pub struct LogicalOperatorReplacement;

impl Transformer for LogicalOperatorReplacement {
    fn id(&self) -> TransformationId {
        TransformationId::LogicalOperatorReplacement
    }

    fn apply(&self, node: &QueryNode) -> Result<Vec<QueryNode>> {
        let clause = match node {
            QueryNode::Boolean(b) => b,
            QueryNode::Keyword(_) => return Ok(Vec::new()),
        };

        let replacement = match clause.operator {
            Operator::And => Operator::Or,
            Operator::Or => Operator::And,
            Operator::Not | Operator::Adj(_) => return Ok(Vec::new()),
        };

        Ok(vec![QueryNode::Boolean(BooleanNode::new(
            replacement,
            clause.children.clone(),
        ))])
    }
}

/// Leave-one-out removal of a clause's children.
#[derive(Debug, Default)]
pub struct ClauseRemoval;

impl Transformer for ClauseRemoval {
    fn id(&self) -> TransformationId {
        TransformationId::ClauseRemoval
    }

    fn apply(&self, node: &QueryNode) -> Result<Vec<QueryNode>> {
        let clause = match node {
            QueryNode::Boolean(b) => b,
            QueryNode::Keyword(_) => return Ok(Vec::new()),
        };

        // Removing the only child would leave an empty clause.
        if clause.children.len() < 2 {
            return Ok(Vec::new());
        }

        Ok((0..clause.children.len())
            .map(|i| QueryNode::Boolean(clause.with_child_removed(i)))
            .collect())
    }
}
