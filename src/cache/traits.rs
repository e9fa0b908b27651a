//! Cache contract shared by all cache backends.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::backend::ScoredDoc;
use crate::error::Result;
use crate::query::{Fingerprint, QueryNode};

/// A cached resolution: the originating query and its document set.
///
/// Persistent caches serialize entries losslessly; `set` then `get` must
/// return an equal entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The query that produced the documents.
    pub query: QueryNode,
    /// The resolved documents.
    pub docs: Vec<ScoredDoc>,
}

impl CacheEntry {
    /// Create a cache entry.
    pub fn new(query: QueryNode, docs: Vec<ScoredDoc>) -> Self {
        CacheEntry { query, docs }
    }
}

/// A content-addressed store mapping query fingerprints to resolved
/// result sets.
///
/// A miss is `Ok(None)` — a sentinel, not an error. Implementations must
/// be safe for concurrent reads and writes from evaluation rounds sharing
/// one instance; no transaction boundary beyond single get/set calls is
/// required.
pub trait QueryCache: Send + Sync + Debug {
    /// Look up a fingerprint. `Ok(None)` signals a miss.
    fn get(&self, fingerprint: &Fingerprint) -> Result<Option<CacheEntry>>;

    /// Store an entry under a fingerprint.
    fn set(&self, fingerprint: &Fingerprint, entry: CacheEntry) -> Result<()>;
}
