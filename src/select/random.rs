//! Random selection.

use rand::seq::IndexedRandom;

use crate::error::Result;
use crate::select::Selector;
use crate::transform::CandidateQuery;

/// Adopts an arbitrary candidate each round; stops at a fixed depth.
///
/// Useful as a lower-bound baseline for the other selectors.
#[derive(Debug)]
pub struct RandomSelector {
    max_depth: usize,
    depth: usize,
}

impl RandomSelector {
    /// Create a random selector.
    pub fn new(max_depth: usize) -> Self {
        RandomSelector {
            max_depth,
            depth: 0,
        }
    }
}

impl Selector for RandomSelector {
    fn select(
        &mut self,
        current: &CandidateQuery,
        candidates: Vec<CandidateQuery>,
    ) -> Result<CandidateQuery> {
        self.depth += 1;
        Ok(candidates
            .choose(&mut rand::rng())
            .cloned()
            .unwrap_or_else(|| current.clone()))
    }

    fn should_stop(&self) -> bool {
        self.depth >= self.max_depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::QueryNode;

    #[test]
    fn test_adopts_some_candidate() {
        let mut selector = RandomSelector::new(2);
        let current = CandidateQuery::seed("t1", QueryNode::keyword("seed"));
        let candidates = vec![
            CandidateQuery::seed("t1", QueryNode::keyword("a")),
            CandidateQuery::seed("t1", QueryNode::keyword("b")),
        ];

        let adopted = selector.select(&current, candidates.clone()).unwrap();
        assert!(candidates.iter().any(|c| c.query == adopted.query));
        assert!(!selector.should_stop());

        selector.select(&current, candidates).unwrap();
        assert!(selector.should_stop());
    }

    #[test]
    fn test_empty_round_returns_current() {
        let mut selector = RandomSelector::new(3);
        let current = CandidateQuery::seed("t1", QueryNode::keyword("seed"));

        let adopted = selector.select(&current, Vec::new()).unwrap();
        assert_eq!(adopted.query, current.query);
    }
}
