//! Pool-reduction strategies between generation rounds.

pub mod evaluated;
pub mod operator;

use std::fmt::Debug;

pub use evaluated::{EvaluationSampler, EvaluationStrategy};
pub use operator::{BalancedSampler, RandomSampler, StratifiedSampler};

use crate::transform::CandidateQuery;

/// Size bound shared by all samplers: `max(min, ⌈ratio·|pool|⌉)`.
#[derive(Debug, Clone, Copy)]
pub struct SampleBound {
    /// Minimum pool size to keep.
    pub min: usize,
    /// Fraction of the pool to keep.
    pub ratio: f64,
}

impl SampleBound {
    /// Create a bound.
    pub fn new(min: usize, ratio: f64) -> Self {
        SampleBound { min, ratio }
    }

    /// Target size for a pool.
    pub fn target(&self, pool_size: usize) -> usize {
        self.min.max((self.ratio * pool_size as f64).ceil() as usize)
    }
}

/// Cuts a candidate pool down to the bound's target size.
///
/// Pools already within the bound pass through unchanged.
pub trait Sampler: Send + Sync + Debug {
    /// Reduce a pool.
    fn sample(&self, pool: Vec<CandidateQuery>) -> Vec<CandidateQuery>;
}
