//! Boolean query AST and content fingerprinting.

pub mod fingerprint;
pub mod node;

pub use fingerprint::Fingerprint;
pub use node::{BooleanNode, Keyword, Operator, QueryNode, fields};
