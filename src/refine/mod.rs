//! The refinement loop: generate, sample, select, repeat.

use std::sync::Arc;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::features::FeatureSet;
use crate::sample::Sampler;
use crate::select::Selector;
use crate::transform::{CandidateQuery, TransformationEngine};

/// Configuration for a refinement run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefineConfig {
    /// Upper bound on rounds, independent of the selector's own stopping
    /// criterion.
    pub max_rounds: usize,
}

impl Default for RefineConfig {
    fn default() -> Self {
        RefineConfig { max_rounds: 10 }
    }
}

/// The outcome of a refinement run: the adopted query, its full edit
/// chain (inside the candidate), and the feature history of every
/// adopted step.
#[derive(Debug, Clone)]
pub struct RefineOutcome {
    /// The adopted candidate, carrying the edit chain from the seed.
    pub adopted: CandidateQuery,
    /// Number of rounds executed.
    pub rounds: usize,
    /// Feature vectors of the adopted candidate after each round.
    pub history: Vec<FeatureSet>,
}

/// Drives a selector over repeated transformation rounds.
///
/// Transient backend errors are absorbed inside generation and candidate
/// evaluation; only structural and fatal errors reach the caller.
#[derive(Debug)]
pub struct ChainDriver {
    engine: Arc<TransformationEngine>,
    sampler: Option<Arc<dyn Sampler>>,
    config: RefineConfig,
}

impl ChainDriver {
    /// Create a driver without sampling.
    pub fn new(engine: Arc<TransformationEngine>) -> Self {
        ChainDriver {
            engine,
            sampler: None,
            config: RefineConfig::default(),
        }
    }

    /// Bound each round's candidate pool with a sampler.
    pub fn with_sampler(mut self, sampler: Arc<dyn Sampler>) -> Self {
        self.sampler = Some(sampler);
        self
    }

    /// Set the run configuration.
    pub fn with_config(mut self, config: RefineConfig) -> Self {
        self.config = config;
        self
    }

    /// Refine a seed query until the selector stops or the round bound is
    /// hit.
    pub fn refine(
        &self,
        seed: &CandidateQuery,
        selector: &mut dyn Selector,
    ) -> Result<RefineOutcome> {
        let mut current = seed.clone();
        let mut history = Vec::new();
        let mut rounds = 0;

        while rounds < self.config.max_rounds && !selector.should_stop() {
            rounds += 1;

            let mut candidates = self.engine.generate(&current)?;
            if let Some(sampler) = &self.sampler {
                candidates = sampler.sample(candidates);
            }
            debug!("round {rounds}: {} candidates", candidates.len());

            let adopted = selector.select(&current, candidates)?;
            history.push(adopted.features.clone());
            current = adopted;
        }

        info!(
            "refined {} over {rounds} rounds into {}",
            seed.query.canonical(),
            current.query.canonical()
        );
        Ok(RefineOutcome {
            adopted: current,
            rounds,
            history,
        })
    }
}
