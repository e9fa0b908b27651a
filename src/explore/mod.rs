//! Exploration drivers over repeated transformation rounds.

pub mod breadth;
pub mod depth;

pub use breadth::BreadthFirstExplorer;
pub use depth::DepthFirstExplorer;

use crate::features::FeatureSet;
use crate::transform::CandidateQuery;

/// When a breadth-first exploration ends.
#[derive(Debug, Clone, Copy)]
pub enum StoppingCondition {
    /// Stop after a fixed number of rounds.
    Depth(usize),
    /// Stop when the whole frontier has drifted beyond `max_distance`
    /// (cosine distance from the seed baseline's features), or at
    /// `max_depth` rounds, whichever comes first.
    Drift { max_distance: f64, max_depth: usize },
}

impl StoppingCondition {
    /// Whether exploration should stop after this round.
    pub fn should_stop(
        &self,
        round: usize,
        frontier: &[CandidateQuery],
        reference: &FeatureSet,
    ) -> bool {
        match self {
            StoppingCondition::Depth(depth) => round >= *depth,
            StoppingCondition::Drift {
                max_distance,
                max_depth,
            } => {
                if round >= *max_depth {
                    return true;
                }
                frontier
                    .iter()
                    .all(|c| reference.cosine_distance(&c.features) > *max_distance)
            }
        }
    }
}
