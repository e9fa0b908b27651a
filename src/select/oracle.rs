//! Oracle selection against ground-truth judgments.

use std::sync::Arc;

use log::{debug, warn};

use crate::error::Result;
use crate::eval::{Evaluator, QueryJudgments, RelevantRetrieved};
use crate::logical::TreeEvaluator;
use crate::select::Selector;
use crate::transform::CandidateQuery;

/// Grid-search oracle: adopts the candidate retrieving the most relevant
/// documents without retrieving more documents overall than the current
/// query does.
///
/// Stops at its maximum depth or as soon as a round fails to improve the
/// relevant-retrieved count.
#[derive(Debug)]
pub struct OracleSelector {
    tree: Arc<TreeEvaluator>,
    judgments: QueryJudgments,
    max_depth: usize,
    depth: usize,
    stalled: bool,
}

impl OracleSelector {
    /// Create an oracle selector.
    pub fn new(tree: Arc<TreeEvaluator>, judgments: QueryJudgments, max_depth: usize) -> Self {
        OracleSelector {
            tree,
            judgments,
            max_depth,
            depth: 0,
            stalled: false,
        }
    }

    /// Resolve a candidate into (relevant retrieved, total retrieved).
    /// `None` when the candidate cannot be executed.
    fn resolve(&self, candidate: &CandidateQuery) -> Option<(f64, usize)> {
        match self.tree.evaluate(&candidate.query) {
            Ok(node) => {
                let results = node.docs().to_scored_docs();
                let relevant = RelevantRetrieved.score(&results, &self.judgments);
                Some((relevant, results.len()))
            }
            Err(err) => {
                warn!(
                    "oracle skipping candidate {}: {err}",
                    candidate.query.canonical()
                );
                None
            }
        }
    }
}

impl Selector for OracleSelector {
    fn select(
        &mut self,
        current: &CandidateQuery,
        candidates: Vec<CandidateQuery>,
    ) -> Result<CandidateQuery> {
        self.depth += 1;

        let (current_relevant, current_total) = match self.resolve(current) {
            Some(resolved) => resolved,
            None => {
                // The current query itself cannot be executed; nothing to
                // improve against.
                self.stalled = true;
                return Ok(current.clone());
            }
        };

        let mut best: Option<(CandidateQuery, f64)> = None;
        for candidate in candidates {
            let Some((relevant, total)) = self.resolve(&candidate) else {
                continue;
            };
            if total > current_total {
                continue;
            }
            let better = match &best {
                Some((_, best_relevant)) => relevant > *best_relevant,
                None => true,
            };
            if better {
                best = Some((candidate, relevant));
            }
        }

        match best {
            Some((candidate, relevant)) if relevant > current_relevant => {
                debug!(
                    "oracle adopts {} ({relevant} relevant, was {current_relevant})",
                    candidate.query.canonical()
                );
                Ok(candidate)
            }
            _ => {
                self.stalled = true;
                Ok(current.clone())
            }
        }
    }

    fn should_stop(&self) -> bool {
        self.stalled || self.depth >= self.max_depth
    }
}

/// Rank-first oracle: always adopts the single best candidate by one
/// chosen metric.
///
/// Stops at its maximum depth or when the adopted candidate equals the
/// input (a no-op fixpoint).
#[derive(Debug)]
pub struct RankOracleSelector {
    tree: Arc<TreeEvaluator>,
    evaluator: Arc<dyn Evaluator>,
    judgments: QueryJudgments,
    max_depth: usize,
    depth: usize,
    fixpoint: bool,
}

impl RankOracleSelector {
    /// Create a rank-oracle selector over a metric.
    pub fn new(
        tree: Arc<TreeEvaluator>,
        evaluator: Arc<dyn Evaluator>,
        judgments: QueryJudgments,
        max_depth: usize,
    ) -> Self {
        RankOracleSelector {
            tree,
            evaluator,
            judgments,
            max_depth,
            depth: 0,
            fixpoint: false,
        }
    }
}

impl Selector for RankOracleSelector {
    fn select(
        &mut self,
        current: &CandidateQuery,
        candidates: Vec<CandidateQuery>,
    ) -> Result<CandidateQuery> {
        self.depth += 1;

        let mut best: Option<(CandidateQuery, f64)> = None;
        for candidate in candidates {
            let node = match self.tree.evaluate(&candidate.query) {
                Ok(node) => node,
                Err(err) => {
                    warn!(
                        "rank oracle skipping candidate {}: {err}",
                        candidate.query.canonical()
                    );
                    continue;
                }
            };
            let results = node.docs().to_scored_docs();
            let score = self.evaluator.score(&results, &self.judgments);
            let better = match &best {
                Some((_, best_score)) => score > *best_score,
                None => true,
            };
            if better {
                best = Some((candidate, score));
            }
        }

        match best {
            Some((candidate, _)) => {
                if candidate.fingerprint() == current.fingerprint() {
                    self.fixpoint = true;
                }
                Ok(candidate)
            }
            None => {
                self.fixpoint = true;
                Ok(current.clone())
            }
        }
    }

    fn should_stop(&self) -> bool {
        self.fixpoint || self.depth >= self.max_depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::cache::MemoryCache;
    use crate::eval::Precision;
    use crate::query::{QueryNode, fields};

    fn tree() -> Arc<TreeEvaluator> {
        let backend = MemoryBackend::new();
        backend.add_document("d1", fields::TITLE, "alpha");
        backend.add_document("d2", fields::TITLE, "alpha beta");
        backend.add_document("d3", fields::TITLE, "beta");
        backend.add_document("d4", fields::TITLE, "gamma noise");
        Arc::new(TreeEvaluator::new(
            Arc::new(backend),
            Arc::new(MemoryCache::new()),
        ))
    }

    fn judgments() -> QueryJudgments {
        QueryJudgments::from_pairs("t1", vec![("d1", 1.0), ("d2", 1.0), ("d3", 1.0)])
    }

    fn seed(text: &str) -> CandidateQuery {
        CandidateQuery::seed("t1", QueryNode::keyword(text))
    }

    #[test]
    fn test_oracle_adopts_improvement_within_budget() {
        let mut oracle = OracleSelector::new(tree(), judgments(), 5);

        // Current: OR(alpha, gamma) retrieves d1, d2, d4 (2 relevant, 3 total).
        let current = CandidateQuery::seed(
            "t1",
            QueryNode::or(vec![QueryNode::keyword("alpha"), QueryNode::keyword("gamma")]),
        );
        // OR(alpha, beta) retrieves d1, d2, d3: 3 relevant, same total.
        let better = CandidateQuery::seed(
            "t1",
            QueryNode::or(vec![QueryNode::keyword("alpha"), QueryNode::keyword("beta")]),
        );

        let adopted = oracle.select(&current, vec![seed("gamma"), better.clone()]).unwrap();
        assert_eq!(adopted.query, better.query);
        assert!(!oracle.should_stop());
    }

    #[test]
    fn test_oracle_rejects_larger_retrieval() {
        let mut oracle = OracleSelector::new(tree(), judgments(), 5);

        // Current: alpha retrieves d1, d2 (2 relevant, 2 total).
        let current = seed("alpha");
        // OR(alpha, beta) retrieves 3 relevant but 3 total: over budget.
        let bigger = CandidateQuery::seed(
            "t1",
            QueryNode::or(vec![QueryNode::keyword("alpha"), QueryNode::keyword("beta")]),
        );

        let adopted = oracle.select(&current, vec![bigger]).unwrap();
        assert_eq!(adopted.query, current.query);
        assert!(oracle.should_stop());
    }

    #[test]
    fn test_oracle_stops_at_max_depth() {
        let mut oracle = OracleSelector::new(tree(), judgments(), 1);

        // Current: gamma retrieves only the unjudged d4 (0 relevant, 1 total).
        let current = seed("gamma");
        // "alpha beta" matches d2 only: 1 relevant within the same budget.
        let better = seed("alpha beta");
        let adopted = oracle.select(&current, vec![better.clone()]).unwrap();

        assert_eq!(adopted.query, better.query);
        assert!(oracle.should_stop());
    }

    #[test]
    fn test_oracle_skips_failing_candidates() {
        let mut oracle = OracleSelector::new(tree(), judgments(), 5);

        let current = seed("gamma");
        let broken = CandidateQuery::seed("t1", QueryNode::and(vec![]));
        let better = seed("alpha beta");

        let adopted = oracle.select(&current, vec![broken, better.clone()]).unwrap();
        assert_eq!(adopted.query, better.query);
    }

    #[test]
    fn test_rank_oracle_adopts_best_metric() {
        let mut selector =
            RankOracleSelector::new(tree(), Arc::new(Precision), judgments(), 5);

        let current = seed("gamma");
        // alpha: precision 1.0; OR(gamma, alpha): precision 2/3.
        let candidates = vec![
            CandidateQuery::seed(
                "t1",
                QueryNode::or(vec![QueryNode::keyword("gamma"), QueryNode::keyword("alpha")]),
            ),
            seed("alpha"),
        ];

        let adopted = selector.select(&current, candidates).unwrap();
        assert_eq!(adopted.query.canonical(), "alpha");
        assert!(!selector.should_stop());
    }

    #[test]
    fn test_rank_oracle_stops_at_fixpoint() {
        let mut selector =
            RankOracleSelector::new(tree(), Arc::new(Precision), judgments(), 5);

        let current = seed("alpha");
        // The best candidate is the current query itself.
        let adopted = selector
            .select(&current, vec![current.clone(), seed("gamma")])
            .unwrap();

        assert_eq!(adopted.fingerprint(), current.fingerprint());
        assert!(selector.should_stop());
    }
}
