//! Pass-through selector that logs training data.

use std::io::Write;
use std::sync::Arc;

use chrono::Utc;
use log::warn;
use parking_lot::Mutex;

use crate::error::Result;
use crate::eval::{Evaluator, QueryJudgments};
use crate::features::LearntFeature;
use crate::logical::TreeEvaluator;
use crate::select::Selector;
use crate::transform::CandidateQuery;

/// Serializes every candidate's features and scores in the reinforcement
/// record format for later offline learning, then hands the current query
/// back unchanged.
///
/// Stops after its configured number of logging rounds.
pub struct ReinforcementLogger<W: Write + Send> {
    writer: Mutex<W>,
    tree: Arc<TreeEvaluator>,
    evaluators: Vec<Arc<dyn Evaluator>>,
    judgments: QueryJudgments,
    max_rounds: usize,
    rounds: usize,
}

impl<W: Write + Send> std::fmt::Debug for ReinforcementLogger<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReinforcementLogger")
            .field("rounds", &self.rounds)
            .field("max_rounds", &self.max_rounds)
            .finish()
    }
}

impl<W: Write + Send> ReinforcementLogger<W> {
    /// Create a logger; writes a timestamped header line immediately.
    pub fn new(
        mut writer: W,
        tree: Arc<TreeEvaluator>,
        evaluators: Vec<Arc<dyn Evaluator>>,
        judgments: QueryJudgments,
        max_rounds: usize,
    ) -> Result<Self> {
        writeln!(
            writer,
            "# {} topic={}",
            Utc::now().to_rfc3339(),
            judgments.topic
        )?;
        Ok(ReinforcementLogger {
            writer: Mutex::new(writer),
            tree,
            evaluators,
            judgments,
            max_rounds,
            rounds: 0,
        })
    }

    /// Consume the logger and return its writer.
    pub fn into_writer(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write + Send> Selector for ReinforcementLogger<W> {
    fn select(
        &mut self,
        current: &CandidateQuery,
        candidates: Vec<CandidateQuery>,
    ) -> Result<CandidateQuery> {
        self.rounds += 1;

        let mut writer = self.writer.lock();
        for candidate in candidates {
            let node = match self.tree.evaluate(&candidate.query) {
                Ok(node) => node,
                Err(err) => {
                    warn!(
                        "not logging unevaluable candidate {}: {err}",
                        candidate.query.canonical()
                    );
                    continue;
                }
            };
            let results = node.docs().to_scored_docs();
            let scores: Vec<f64> = self
                .evaluators
                .iter()
                .map(|evaluator| evaluator.score(&results, &self.judgments))
                .collect();

            let record = LearntFeature::new(
                candidate.features.clone(),
                scores,
                candidate.topic.clone(),
                candidate.query.canonical(),
            );
            writeln!(writer, "{}", record.to_reinforcement_line())?;
        }
        writer.flush()?;

        Ok(current.clone())
    }

    fn should_stop(&self) -> bool {
        self.rounds >= self.max_rounds
    }
}
