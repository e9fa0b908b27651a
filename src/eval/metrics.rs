//! Counting evaluators over ranked result lists.

use std::fmt::Debug;

use crate::backend::ScoredDoc;
use crate::eval::judgments::QueryJudgments;

/// Scores a result list against relevance judgments.
pub trait Evaluator: Send + Sync + Debug {
    /// Metric name.
    fn name(&self) -> &str;

    /// Score a result list.
    fn score(&self, results: &[ScoredDoc], judgments: &QueryJudgments) -> f64;
}

fn relevant_retrieved(results: &[ScoredDoc], judgments: &QueryJudgments) -> usize {
    results
        .iter()
        .filter(|doc| judgments.is_relevant(&doc.doc_id))
        .count()
}

/// Number of retrieved documents judged relevant.
#[derive(Debug, Default)]
pub struct RelevantRetrieved;

impl Evaluator for RelevantRetrieved {
    fn name(&self) -> &str {
        "relevant_retrieved"
    }

    fn score(&self, results: &[ScoredDoc], judgments: &QueryJudgments) -> f64 {
        relevant_retrieved(results, judgments) as f64
    }
}

/// Number of retrieved documents.
#[derive(Debug, Default)]
pub struct RetrievedCount;

impl Evaluator for RetrievedCount {
    fn name(&self) -> &str {
        "retrieved"
    }

    fn score(&self, results: &[ScoredDoc], _judgments: &QueryJudgments) -> f64 {
        results.len() as f64
    }
}

/// Fraction of retrieved documents that are relevant.
#[derive(Debug, Default)]
pub struct Precision;

impl Evaluator for Precision {
    fn name(&self) -> &str {
        "precision"
    }

    fn score(&self, results: &[ScoredDoc], judgments: &QueryJudgments) -> f64 {
        if results.is_empty() {
            return 0.0;
        }
        relevant_retrieved(results, judgments) as f64 / results.len() as f64
    }
}

/// Fraction of relevant documents that are retrieved.
#[derive(Debug, Default)]
pub struct Recall;

impl Evaluator for Recall {
    fn name(&self) -> &str {
        "recall"
    }

    fn score(&self, results: &[ScoredDoc], judgments: &QueryJudgments) -> f64 {
        let relevant = judgments.relevant_count();
        if relevant == 0 {
            return 0.0;
        }
        relevant_retrieved(results, judgments) as f64 / relevant as f64
    }
}

/// Weighted harmonic mean of precision and recall.
#[derive(Debug)]
pub struct FBeta {
    beta: f64,
    name: String,
}

impl FBeta {
    /// Create an F-measure with the given beta.
    pub fn new(beta: f64) -> Self {
        FBeta {
            beta,
            name: format!("f{beta}"),
        }
    }
}

impl Default for FBeta {
    fn default() -> Self {
        FBeta::new(1.0)
    }
}

impl Evaluator for FBeta {
    fn name(&self) -> &str {
        &self.name
    }

    fn score(&self, results: &[ScoredDoc], judgments: &QueryJudgments) -> f64 {
        let precision = Precision.score(results, judgments);
        let recall = Recall.score(results, judgments);
        if precision == 0.0 && recall == 0.0 {
            return 0.0;
        }
        let beta_sq = self.beta * self.beta;
        (1.0 + beta_sq) * precision * recall / (beta_sq * precision + recall)
    }
}
