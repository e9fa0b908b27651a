//! Selection driven by a trained ranking model.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use crate::error::{QuarrelError, Result};
use crate::features::FeatureSet;
use crate::select::Selector;
use crate::transform::CandidateQuery;

/// A trained ranking model scoring candidate feature vectors.
///
/// Training happens offline and elsewhere; this crate only consumes the
/// model.
pub trait RankingModel: Send + Sync + Debug {
    /// Score a feature vector; higher ranks first.
    fn score(&self, features: &FeatureSet) -> Result<f64>;
}

/// A linear model over registry feature ids.
#[derive(Debug, Default)]
pub struct LinearRankingModel {
    weights: HashMap<u32, f64>,
}

impl LinearRankingModel {
    /// Create a model from (feature id, weight) pairs.
    pub fn from_weights(weights: Vec<(u32, f64)>) -> Self {
        LinearRankingModel {
            weights: weights.into_iter().collect(),
        }
    }
}

impl RankingModel for LinearRankingModel {
    fn score(&self, features: &FeatureSet) -> Result<f64> {
        Ok(features
            .features()
            .iter()
            .filter_map(|f| self.weights.get(&f.id).map(|w| w * f.score))
            .sum())
    }
}

/// Adopts the top-ranked candidate according to a ranking model.
///
/// Stops at a fixed depth or when a round has no candidates.
#[derive(Debug)]
pub struct LtrSelector {
    model: Arc<dyn RankingModel>,
    max_depth: usize,
    depth: usize,
    exhausted: bool,
}

impl LtrSelector {
    /// Create a selector over a model.
    pub fn new(model: Arc<dyn RankingModel>, max_depth: usize) -> Self {
        LtrSelector {
            model,
            max_depth,
            depth: 0,
            exhausted: false,
        }
    }
}

impl Selector for LtrSelector {
    fn select(
        &mut self,
        current: &CandidateQuery,
        candidates: Vec<CandidateQuery>,
    ) -> Result<CandidateQuery> {
        self.depth += 1;

        if candidates.is_empty() {
            self.exhausted = true;
            return Ok(current.clone());
        }

        let mut best: Option<(CandidateQuery, f64)> = None;
        for candidate in candidates {
            let score = self.model.score(&candidate.features)?;
            let better = match &best {
                Some((_, best_score)) => score > *best_score,
                None => true,
            };
            if better {
                best = Some((candidate, score));
            }
        }

        best.map(|(candidate, _)| candidate)
            .ok_or_else(|| QuarrelError::selector("no candidate survived ranking"))
    }

    fn should_stop(&self) -> bool {
        self.exhausted || self.depth >= self.max_depth
    }
}
