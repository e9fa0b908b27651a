//! Depth-first exploration under a shared emission budget.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use rand::Rng;
use rand::seq::SliceRandom;

use crate::error::Result;
use crate::query::Fingerprint;
use crate::transform::{CandidateQuery, TransformationEngine};

/// Walks one candidate chain at a time, emitting visited candidates
/// against a shared budget.
///
/// A sampling predicate (emission probability) decides whether a visited
/// candidate is emitted, consuming one unit of budget; the candidate's
/// shuffled variants are then visited recursively. Recursion halts when
/// the budget reaches zero or the depth guard is hit. Starting a new
/// exploration from a chain-less seed resets the budget.
#[derive(Debug)]
pub struct DepthFirstExplorer {
    engine: Arc<TransformationEngine>,
    budget: usize,
    remaining: AtomicUsize,
    emission_probability: f64,
    max_depth: usize,
}

impl DepthFirstExplorer {
    /// Create a depth-first explorer.
    pub fn new(
        engine: Arc<TransformationEngine>,
        budget: usize,
        emission_probability: f64,
        max_depth: usize,
    ) -> Self {
        DepthFirstExplorer {
            engine,
            budget,
            remaining: AtomicUsize::new(budget),
            emission_probability,
            max_depth,
        }
    }

    /// Run the exploration from a seed.
    pub fn explore(&self, seed: &CandidateQuery) -> Result<Vec<CandidateQuery>> {
        if seed.chain.is_empty() {
            self.remaining.store(self.budget, Ordering::SeqCst);
        }

        let mut out = Vec::new();
        let mut visited = HashSet::new();
        visited.insert(seed.fingerprint());
        self.visit(seed, 0, &mut visited, &mut out)?;
        Ok(out)
    }

    /// Consume one unit of budget if any remains.
    fn consume(&self) -> bool {
        self.remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |remaining| {
                remaining.checked_sub(1)
            })
            .is_ok()
    }

    fn visit(
        &self,
        candidate: &CandidateQuery,
        depth: usize,
        visited: &mut HashSet<Fingerprint>,
        out: &mut Vec<CandidateQuery>,
    ) -> Result<()> {
        if self.remaining.load(Ordering::SeqCst) == 0 || depth >= self.max_depth {
            return Ok(());
        }

        if depth > 0 && rand::rng().random_bool(self.emission_probability) {
            if !self.consume() {
                return Ok(());
            }
            out.push(candidate.clone());
        }

        let mut variants = self.engine.generate(candidate)?;
        variants.retain(|variant| visited.insert(variant.fingerprint()));
        variants.shuffle(&mut rand::rng());

        for variant in &variants {
            if self.remaining.load(Ordering::SeqCst) == 0 {
                break;
            }
            self.visit(variant, depth + 1, visited, out)?;
        }
        Ok(())
    }
}
