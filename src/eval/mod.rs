//! Relevance judgments and result-list evaluation.

pub mod judgments;
pub mod metrics;

pub use judgments::QueryJudgments;
pub use metrics::{Evaluator, FBeta, Precision, Recall, RelevantRetrieved, RetrievedCount};
