//! Set-combination operators for internal tree nodes.

use std::sync::Arc;

use crate::logical::node::{DocSet, LogicalNode};
use crate::query::Operator;

/// How a combinator merges its children's document sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombineOp {
    /// AND: documents present in every child.
    Intersect,
    /// OR: documents present in any child.
    Unite,
    /// NOT: the first child's documents minus the union of the rest.
    Complement,
}

impl CombineOp {
    /// Select the combination for a clause operator. Anything that is not
    /// AND or NOT combines as a union.
    pub fn from_operator(operator: Operator) -> CombineOp {
        match operator {
            Operator::And => CombineOp::Intersect,
            Operator::Not => CombineOp::Complement,
            Operator::Or | Operator::Adj(_) => CombineOp::Unite,
        }
    }

    /// Combine resolved children into one document set.
    pub fn combine(&self, children: &[Arc<LogicalNode>]) -> DocSet {
        let sets: Vec<&DocSet> = children.iter().map(|c| c.docs()).collect();
        match self {
            CombineOp::Intersect => DocSet::intersect_all(&sets),
            CombineOp::Unite => DocSet::union_all(&sets),
            CombineOp::Complement => DocSet::complement(&sets),
        }
    }
}
