//! In-process cache backed by a hash map.

use std::collections::HashMap;

use ahash::RandomState;
use parking_lot::RwLock;

use crate::cache::traits::{CacheEntry, QueryCache};
use crate::error::Result;
use crate::query::Fingerprint;

/// In-process cache. Contents do not outlive the process.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<Fingerprint, CacheEntry, RandomState>>,
}

impl MemoryCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        MemoryCache::default()
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl QueryCache for MemoryCache {
    fn get(&self, fingerprint: &Fingerprint) -> Result<Option<CacheEntry>> {
        Ok(self.entries.read().get(fingerprint).cloned())
    }

    fn set(&self, fingerprint: &Fingerprint, entry: CacheEntry) -> Result<()> {
        self.entries.write().insert(*fingerprint, entry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ScoredDoc;
    use crate::query::QueryNode;

    #[test]
    fn test_round_trip() {
        let cache = MemoryCache::new();
        let query = QueryNode::keyword("heart");
        let fingerprint = query.fingerprint();
        let entry = CacheEntry::new(query, vec![ScoredDoc::new("d1", 1.0)]);

        cache.set(&fingerprint, entry.clone()).unwrap();
        assert_eq!(cache.get(&fingerprint).unwrap(), Some(entry));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_miss_is_none() {
        let cache = MemoryCache::new();
        let fingerprint = QueryNode::keyword("absent").fingerprint();

        assert!(cache.get(&fingerprint).unwrap().is_none());
    }

    #[test]
    fn test_overwrite() {
        let cache = MemoryCache::new();
        let query = QueryNode::keyword("heart");
        let fingerprint = query.fingerprint();

        cache
            .set(&fingerprint, CacheEntry::new(query.clone(), Vec::new()))
            .unwrap();
        let updated = CacheEntry::new(query, vec![ScoredDoc::new("d2", 0.5)]);
        cache.set(&fingerprint, updated.clone()).unwrap();

        assert_eq!(cache.get(&fingerprint).unwrap(), Some(updated));
        assert_eq!(cache.len(), 1);
    }
}
