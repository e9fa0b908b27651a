//! Operator-grouped and random sampling.

use rand::seq::SliceRandom;

use crate::sample::{SampleBound, Sampler};
use crate::transform::{CandidateQuery, TransformationId};

/// Group a pool by originating operator, preserving first-seen group
/// order and within-group order.
fn group_by_operator(
    pool: Vec<CandidateQuery>,
) -> Vec<(Option<TransformationId>, Vec<CandidateQuery>)> {
    let mut groups: Vec<(Option<TransformationId>, Vec<CandidateQuery>)> = Vec::new();
    for candidate in pool {
        let key = candidate.transformation;
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, group)) => group.push(candidate),
            None => groups.push((key, vec![candidate])),
        }
    }
    groups
}

/// Uniform random sampling.
#[derive(Debug)]
pub struct RandomSampler {
    bound: SampleBound,
}

impl RandomSampler {
    /// Create a random sampler.
    pub fn new(bound: SampleBound) -> Self {
        RandomSampler { bound }
    }
}

impl Sampler for RandomSampler {
    fn sample(&self, pool: Vec<CandidateQuery>) -> Vec<CandidateQuery> {
        let target = self.bound.target(pool.len());
        if pool.len() <= target {
            return pool;
        }

        let mut pool = pool;
        pool.shuffle(&mut rand::rng());
        pool.truncate(target);
        pool
    }
}

/// Round-robin over distinct originating operators.
///
/// Each operator group contributes in turn until the target is reached,
/// so rare operators are represented even in small samples.
#[derive(Debug)]
pub struct BalancedSampler {
    bound: SampleBound,
}

impl BalancedSampler {
    /// Create a balanced sampler.
    pub fn new(bound: SampleBound) -> Self {
        BalancedSampler { bound }
    }
}

impl Sampler for BalancedSampler {
    fn sample(&self, pool: Vec<CandidateQuery>) -> Vec<CandidateQuery> {
        let target = self.bound.target(pool.len());
        if pool.len() <= target {
            return pool;
        }

        let mut groups: Vec<_> = group_by_operator(pool)
            .into_iter()
            .map(|(_, group)| group.into_iter())
            .collect();

        let mut out = Vec::with_capacity(target);
        while out.len() < target {
            let mut exhausted = true;
            for group in &mut groups {
                if let Some(candidate) = group.next() {
                    out.push(candidate);
                    exhausted = false;
                    if out.len() == target {
                        break;
                    }
                }
            }
            if exhausted {
                break;
            }
        }
        out
    }
}

/// Proportional allocation per operator group.
///
/// Each group keeps a share of the target proportional to its size;
/// leftover slots go to the groups with the largest remainders.
#[derive(Debug)]
pub struct StratifiedSampler {
    bound: SampleBound,
}

impl StratifiedSampler {
    /// Create a stratified sampler.
    pub fn new(bound: SampleBound) -> Self {
        StratifiedSampler { bound }
    }
}

impl Sampler for StratifiedSampler {
    fn sample(&self, pool: Vec<CandidateQuery>) -> Vec<CandidateQuery> {
        let total = pool.len();
        let target = self.bound.target(total);
        if total <= target {
            return pool;
        }

        let groups = group_by_operator(pool);
        let mut quotas: Vec<(usize, f64)> = groups
            .iter()
            .enumerate()
            .map(|(i, (_, group))| {
                let exact = target as f64 * group.len() as f64 / total as f64;
                (i, exact)
            })
            .collect();

        let mut allocation: Vec<usize> = quotas.iter().map(|(_, e)| e.floor() as usize).collect();
        let mut assigned: usize = allocation.iter().sum();

        // Largest remainders take the leftover slots.
        quotas.sort_by(|a, b| {
            (b.1 - b.1.floor())
                .partial_cmp(&(a.1 - a.1.floor()))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        for (index, _) in quotas {
            if assigned >= target {
                break;
            }
            if allocation[index] < groups[index].1.len() {
                allocation[index] += 1;
                assigned += 1;
            }
        }

        let mut out = Vec::with_capacity(target);
        for ((_, group), quota) in groups.into_iter().zip(allocation) {
            out.extend(group.into_iter().take(quota));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::QueryNode;

    fn candidate(text: &str, transformation: Option<TransformationId>) -> CandidateQuery {
        let mut candidate = CandidateQuery::seed("t1", QueryNode::keyword(text));
        candidate.transformation = transformation;
        candidate
    }

    fn pool() -> Vec<CandidateQuery> {
        let mut pool = Vec::new();
        for i in 0..8 {
            pool.push(candidate(
                &format!("a{i}"),
                Some(TransformationId::LogicalOperatorReplacement),
            ));
        }
        for i in 0..2 {
            pool.push(candidate(&format!("b{i}"), Some(TransformationId::ClauseRemoval)));
        }
        pool
    }

    #[test]
    fn test_small_pool_passes_through() {
        let sampler = RandomSampler::new(SampleBound::new(20, 0.5));
        let pool = pool();
        let sampled = sampler.sample(pool.clone());
        assert_eq!(sampled.len(), pool.len());
    }

    #[test]
    fn test_random_respects_bound() {
        let sampler = RandomSampler::new(SampleBound::new(3, 0.1));
        let sampled = sampler.sample(pool());
        assert_eq!(sampled.len(), 3);
    }

    #[test]
    fn test_balanced_round_robin() {
        let sampler = BalancedSampler::new(SampleBound::new(4, 0.0));
        let sampled = sampler.sample(pool());

        assert_eq!(sampled.len(), 4);
        let removals = sampled
            .iter()
            .filter(|c| c.transformation == Some(TransformationId::ClauseRemoval))
            .count();
        // Round-robin gives the small group equal turns.
        assert_eq!(removals, 2);
    }

    #[test]
    fn test_balanced_exhausted_groups_stop() {
        let small: Vec<CandidateQuery> = (0..2)
            .map(|i| candidate(&format!("x{i}"), Some(TransformationId::ClauseRemoval)))
            .collect();
        let sampler = BalancedSampler::new(SampleBound::new(1, 0.0));
        // Bound of 1 with a 2-candidate pool: truncates to 1.
        assert_eq!(sampler.sample(small).len(), 1);
    }

    #[test]
    fn test_stratified_is_proportional() {
        let sampler = StratifiedSampler::new(SampleBound::new(5, 0.0));
        let sampled = sampler.sample(pool());

        assert_eq!(sampled.len(), 5);
        let flips = sampled
            .iter()
            .filter(|c| c.transformation == Some(TransformationId::LogicalOperatorReplacement))
            .count();
        let removals = sampled.len() - flips;
        // 8:2 split over 5 slots → 4:1.
        assert_eq!(flips, 4);
        assert_eq!(removals, 1);
    }
}
