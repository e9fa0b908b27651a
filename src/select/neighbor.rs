//! Nearest-neighbor divergence selection.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{QuarrelError, Result};
use crate::features::FeatureSet;
use crate::logical::TreeEvaluator;
use crate::select::Selector;
use crate::transform::CandidateQuery;

/// A stored observation: a feature vector and the score divergence an
/// oracle-trained reference model showed for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exemplar {
    /// The observed feature vector.
    pub features: FeatureSet,
    /// Observed divergence from the reference model.
    pub divergence: f64,
}

/// Estimates each candidate's likely divergence from a reference model by
/// cosine distance to stored exemplars and adopts the safest candidate.
///
/// Stops early when retrieval collapses to zero or divergence stops
/// improving.
#[derive(Debug)]
pub struct NearestNeighborSelector {
    exemplars: Vec<Exemplar>,
    tree: Arc<TreeEvaluator>,
    max_depth: usize,
    depth: usize,
    last_divergence: Option<f64>,
    stopped: bool,
}

impl NearestNeighborSelector {
    /// Create a selector over stored exemplars.
    pub fn new(tree: Arc<TreeEvaluator>, exemplars: Vec<Exemplar>, max_depth: usize) -> Self {
        NearestNeighborSelector {
            exemplars,
            tree,
            max_depth,
            depth: 0,
            last_divergence: None,
            stopped: false,
        }
    }

    /// Load exemplars from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(
        tree: Arc<TreeEvaluator>,
        path: P,
        max_depth: usize,
    ) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let exemplars: Vec<Exemplar> = serde_json::from_str(&raw)?;
        Ok(Self::new(tree, exemplars, max_depth))
    }

    /// Divergence of the nearest exemplar by cosine distance.
    fn estimate(&self, features: &FeatureSet) -> Option<f64> {
        self.exemplars
            .iter()
            .map(|e| (e.features.cosine_distance(features), e.divergence))
            .min_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(_, divergence)| divergence)
    }
}

impl Selector for NearestNeighborSelector {
    fn select(
        &mut self,
        current: &CandidateQuery,
        candidates: Vec<CandidateQuery>,
    ) -> Result<CandidateQuery> {
        self.depth += 1;

        if self.exemplars.is_empty() {
            return Err(QuarrelError::selector("no exemplars loaded"));
        }

        let mut best: Option<(CandidateQuery, f64)> = None;
        for candidate in candidates {
            let Some(estimate) = self.estimate(&candidate.features) else {
                continue;
            };
            let better = match &best {
                Some((_, best_estimate)) => estimate < *best_estimate,
                None => true,
            };
            if better {
                best = Some((candidate, estimate));
            }
        }

        let Some((candidate, estimate)) = best else {
            self.stopped = true;
            return Ok(current.clone());
        };

        // Divergence that stops shrinking is the signal to stop editing.
        if let Some(last) = self.last_divergence {
            if estimate >= last {
                self.stopped = true;
            }
        }
        self.last_divergence = Some(estimate);

        match self.tree.evaluate(&candidate.query) {
            Ok(node) if node.retrieved_count() == 0 => {
                self.stopped = true;
            }
            Ok(_) => {}
            Err(err) => {
                warn!(
                    "could not resolve adopted candidate {}: {err}",
                    candidate.query.canonical()
                );
                self.stopped = true;
            }
        }

        Ok(candidate)
    }

    fn should_stop(&self) -> bool {
        self.stopped || self.depth >= self.max_depth
    }
}
