//! Bounded retry with capped exponential backoff for transient backend errors.

use std::thread;
use std::time::Duration;

use log::warn;

use crate::error::{QuarrelError, Result};
use crate::query::QueryNode;
use crate::backend::traits::{ScoredDoc, SearchBackend, SearchOptions};

/// Retry policy applied at every network-shaped backend call.
///
/// Only transient errors are retried; structural and fatal errors pass
/// through on the first attempt. After `max_attempts` the last transient
/// error is surfaced to the caller.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: usize,
    /// Delay before the first retry.
    pub initial_backoff: Duration,
    /// Upper bound on the delay between attempts.
    pub max_backoff: Duration,
    /// Backoff growth factor.
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 4,
            initial_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_secs(5),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Create a policy with the given attempt bound.
    pub fn new(max_attempts: usize) -> Self {
        RetryPolicy {
            max_attempts,
            ..Default::default()
        }
    }

    /// Set the initial backoff delay.
    pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    /// Set the maximum backoff delay.
    pub fn with_max_backoff(mut self, backoff: Duration) -> Self {
        self.max_backoff = backoff;
        self
    }

    /// Backoff delay before retry number `retry` (1-based).
    pub fn backoff_for(&self, retry: usize) -> Duration {
        let factor = self.multiplier.powi(retry.saturating_sub(1) as i32);
        let delay = self.initial_backoff.mul_f64(factor);
        delay.min(self.max_backoff)
    }

    /// Run an operation under this policy.
    pub fn run<T, F>(&self, label: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Result<T>,
    {
        let attempts = self.max_attempts.max(1);
        let mut last_err: Option<QuarrelError> = None;

        for attempt in 1..=attempts {
            match op() {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < attempts => {
                    let delay = self.backoff_for(attempt);
                    warn!(
                        "{label}: transient backend error (attempt {attempt}/{attempts}), \
                         retrying in {delay:?}: {err}"
                    );
                    thread::sleep(delay);
                    last_err = Some(err);
                }
                Err(err) => return Err(err),
            }
        }

        Err(last_err.unwrap_or_else(|| {
            QuarrelError::backend_unavailable(format!("{label}: retries exhausted"))
        }))
    }
}

/// Decorator applying a [`RetryPolicy`] to every call of a wrapped backend.
#[derive(Debug)]
pub struct RetryingBackend<B> {
    inner: B,
    policy: RetryPolicy,
}

impl<B: SearchBackend> RetryingBackend<B> {
    /// Wrap a backend with the given policy.
    pub fn new(inner: B, policy: RetryPolicy) -> Self {
        RetryingBackend { inner, policy }
    }

    /// The wrapped backend.
    pub fn inner(&self) -> &B {
        &self.inner
    }
}

impl<B: SearchBackend> SearchBackend for RetryingBackend<B> {
    fn execute(&self, query: &QueryNode, options: &SearchOptions) -> Result<Vec<ScoredDoc>> {
        self.policy.run("execute", || self.inner.execute(query, options))
    }

    fn retrieval_size(&self, query: &QueryNode) -> Result<u64> {
        self.policy
            .run("retrieval_size", || self.inner.retrieval_size(query))
    }

    fn term_frequency(&self, field: &str, term: &str) -> Result<u64> {
        self.policy
            .run("term_frequency", || self.inner.term_frequency(field, term))
    }

    fn document_frequency(&self, field: &str, term: &str) -> Result<u64> {
        self.policy.run("document_frequency", || {
            self.inner.document_frequency(field, term)
        })
    }

    fn inverse_document_frequency(&self, field: &str, term: &str) -> Result<f64> {
        self.policy.run("inverse_document_frequency", || {
            self.inner.inverse_document_frequency(field, term)
        })
    }

    fn vocabulary_size(&self) -> Result<u64> {
        self.policy
            .run("vocabulary_size", || self.inner.vocabulary_size())
    }
}
