//! Breadth-first frontier exploration.

use std::collections::HashSet;
use std::sync::Arc;

use log::debug;

use crate::error::Result;
use crate::explore::StoppingCondition;
use crate::features::FeatureSet;
use crate::sample::Sampler;
use crate::transform::{CandidateQuery, TransformationEngine};

/// Explores the edit space one frontier at a time.
///
/// Each round generates all variants of every frontier candidate, pools
/// and de-duplicates them, bounds the pool with the sampler, and advances
/// the frontier to the sampled set. Returns every candidate that ever
/// entered a frontier.
#[derive(Debug)]
pub struct BreadthFirstExplorer {
    engine: Arc<TransformationEngine>,
    sampler: Arc<dyn Sampler>,
    stopping: StoppingCondition,
}

impl BreadthFirstExplorer {
    /// Create a breadth-first explorer.
    pub fn new(
        engine: Arc<TransformationEngine>,
        sampler: Arc<dyn Sampler>,
        stopping: StoppingCondition,
    ) -> Self {
        BreadthFirstExplorer {
            engine,
            sampler,
            stopping,
        }
    }

    /// Run the exploration from a seed.
    pub fn explore(&self, seed: &CandidateQuery) -> Result<Vec<CandidateQuery>> {
        let mut frontier = vec![seed.clone()];
        let mut visited = Vec::new();
        let mut emitted = HashSet::new();
        let mut reference = FeatureSet::new();
        let mut round = 0;

        loop {
            round += 1;

            let mut pool = Vec::new();
            for candidate in &frontier {
                pool.extend(self.engine.generate(candidate)?);
            }
            // Identical variants from different frontier members collapse.
            let mut seen = HashSet::new();
            pool.retain(|candidate| seen.insert(candidate.fingerprint()));

            if round == 1 {
                // The seed baseline anchors drift measurement.
                if let Some(baseline) = pool.iter().find(|c| c.transformation.is_none()) {
                    reference = baseline.features.clone();
                }
            }

            let sampled = self.sampler.sample(pool);
            if sampled.is_empty() {
                break;
            }

            debug!("round {round}: frontier of {}", sampled.len());
            for candidate in &sampled {
                if emitted.insert(candidate.fingerprint()) {
                    visited.push(candidate.clone());
                }
            }

            let stop = self.stopping.should_stop(round, &sampled, &reference);
            frontier = sampled;
            if stop {
                break;
            }
        }

        Ok(visited)
    }
}
