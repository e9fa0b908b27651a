//! Samplers that score candidates against relevance judgments first.

use std::sync::Arc;

use log::warn;

use crate::eval::{Evaluator, QueryJudgments};
use crate::logical::TreeEvaluator;
use crate::sample::{SampleBound, Sampler};
use crate::transform::CandidateQuery;

/// How an evaluation-aware sampler picks from the scored pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationStrategy {
    /// Alternate between the best- and worst-scoring candidates.
    Balanced,
    /// Spread evenly across the score range.
    Stratified,
    /// Prefer the highest-scoring candidates.
    PositiveBiased,
    /// Prefer the lowest-scoring candidates.
    NegativeBiased,
    /// Prefer the candidates retrieving the most documents.
    GreedyByRetrieved,
}

/// Scores every candidate by resolving its logical tree and evaluating
/// the result list, then samples per the chosen strategy.
///
/// Candidates that fail to resolve are skipped; the round continues with
/// the remainder.
#[derive(Debug)]
pub struct EvaluationSampler {
    tree: Arc<TreeEvaluator>,
    evaluator: Arc<dyn Evaluator>,
    judgments: QueryJudgments,
    strategy: EvaluationStrategy,
    bound: SampleBound,
}

impl EvaluationSampler {
    /// Create an evaluation-aware sampler.
    pub fn new(
        tree: Arc<TreeEvaluator>,
        evaluator: Arc<dyn Evaluator>,
        judgments: QueryJudgments,
        strategy: EvaluationStrategy,
        bound: SampleBound,
    ) -> Self {
        EvaluationSampler {
            tree,
            evaluator,
            judgments,
            strategy,
            bound,
        }
    }

    /// Resolve and score the pool; failures are dropped.
    fn scored(&self, pool: Vec<CandidateQuery>) -> Vec<(CandidateQuery, f64, usize)> {
        let mut scored = Vec::with_capacity(pool.len());
        for candidate in pool {
            match self.tree.evaluate(&candidate.query) {
                Ok(node) => {
                    let results = node.docs().to_scored_docs();
                    let score = self.evaluator.score(&results, &self.judgments);
                    let retrieved = results.len();
                    scored.push((candidate, score, retrieved));
                }
                Err(err) => {
                    warn!(
                        "skipping unevaluable candidate {}: {err}",
                        candidate.query.canonical()
                    );
                }
            }
        }
        scored
    }
}

impl Sampler for EvaluationSampler {
    fn sample(&self, pool: Vec<CandidateQuery>) -> Vec<CandidateQuery> {
        let target = self.bound.target(pool.len());
        if pool.len() <= target {
            return pool;
        }

        let mut scored = self.scored(pool);
        match self.strategy {
            EvaluationStrategy::GreedyByRetrieved => {
                scored.sort_by(|a, b| b.2.cmp(&a.2));
            }
            _ => {
                scored.sort_by(|a, b| {
                    b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal)
                });
            }
        }

        let take = target.min(scored.len());
        let picked: Vec<CandidateQuery> = match self.strategy {
            EvaluationStrategy::PositiveBiased | EvaluationStrategy::GreedyByRetrieved => {
                scored.into_iter().take(take).map(|(c, _, _)| c).collect()
            }
            EvaluationStrategy::NegativeBiased => {
                let skip = scored.len() - take;
                scored.into_iter().skip(skip).map(|(c, _, _)| c).collect()
            }
            EvaluationStrategy::Balanced => {
                let mut out = Vec::with_capacity(take);
                let mut candidates: Vec<CandidateQuery> =
                    scored.into_iter().map(|(c, _, _)| c).collect();
                let mut from_front = true;
                while out.len() < take {
                    let next = if from_front {
                        candidates.remove(0)
                    } else {
                        candidates.pop().expect("non-empty while out < take")
                    };
                    out.push(next);
                    from_front = !from_front;
                }
                out
            }
            EvaluationStrategy::Stratified => {
                // One candidate per stratum of the score-sorted pool.
                let len = scored.len();
                let mut out = Vec::with_capacity(take);
                for i in 0..take {
                    let index = i * len / take;
                    out.push(scored[index].0.clone());
                }
                out
            }
        };
        picked
    }
}
