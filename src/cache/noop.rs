//! A cache that never hits.

use crate::cache::traits::{CacheEntry, QueryCache};
use crate::error::Result;
use crate::query::Fingerprint;

/// No-op cache: every lookup is a miss and every store is discarded.
///
/// Useful when callers must re-execute everything against the backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCache;

impl NoopCache {
    /// Create a no-op cache.
    pub fn new() -> Self {
        NoopCache
    }
}

impl QueryCache for NoopCache {
    fn get(&self, _fingerprint: &Fingerprint) -> Result<Option<CacheEntry>> {
        Ok(None)
    }

    fn set(&self, _fingerprint: &Fingerprint, _entry: CacheEntry) -> Result<()> {
        Ok(())
    }
}
