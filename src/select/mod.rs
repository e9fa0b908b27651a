//! Candidate selection state machines.

pub mod logger;
pub mod ltr;
pub mod neighbor;
pub mod oracle;
pub mod random;

use std::fmt::Debug;

pub use logger::ReinforcementLogger;
pub use ltr::{LinearRankingModel, LtrSelector, RankingModel};
pub use neighbor::{Exemplar, NearestNeighborSelector};
pub use oracle::{OracleSelector, RankOracleSelector};
pub use random::RandomSelector;

use crate::error::Result;
use crate::transform::CandidateQuery;

/// A stateful strategy that picks the next query in a chain and decides
/// when the chain is finished.
///
/// `select` consumes one round of candidates and returns the adopted
/// query (possibly the current one, unchanged); `should_stop` reports
/// whether the chain is complete.
pub trait Selector: Send + Debug {
    /// Pick the next query from a round of candidates.
    fn select(
        &mut self,
        current: &CandidateQuery,
        candidates: Vec<CandidateQuery>,
    ) -> Result<CandidateQuery>;

    /// Whether the chain should stop.
    fn should_stop(&self) -> bool;
}
