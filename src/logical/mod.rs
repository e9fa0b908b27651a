//! Logical result trees: cached set algebra over retrieved documents.

pub mod combine;
pub mod evaluator;
pub mod node;

pub use combine::CombineOp;
pub use evaluator::{SeenTable, TreeEvaluator, new_seen_table};
pub use node::{DocSet, LogicalNode};
