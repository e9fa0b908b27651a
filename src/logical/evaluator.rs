//! Top-down construction of resolved logical trees.

use std::collections::HashMap;
use std::sync::Arc;

use ahash::RandomState;
use log::debug;
use parking_lot::RwLock;

use crate::backend::{SearchBackend, SearchOptions};
use crate::cache::{CacheEntry, QueryCache};
use crate::error::{QuarrelError, Result};
use crate::logical::combine::CombineOp;
use crate::logical::node::{DocSet, LogicalNode};
use crate::query::{Fingerprint, QueryNode};

/// Fingerprint-to-node table shared across trees resolved in one round.
pub type SeenTable = Arc<RwLock<HashMap<Fingerprint, Arc<LogicalNode>, RandomState>>>;

/// Create an empty seen table.
pub fn new_seen_table() -> SeenTable {
    Arc::new(RwLock::new(HashMap::default()))
}

/// Builds logical trees that mirror a query AST.
///
/// Leaves and ADJ*n* subtrees execute against the backend; other boolean
/// clauses combine their resolved children with set algebra. Every node is
/// memoized by fingerprint through the seen table and the cache, so a
/// subtree shared between candidates executes at most once per distinct
/// fingerprint.
#[derive(Debug)]
pub struct TreeEvaluator {
    backend: Arc<dyn SearchBackend>,
    cache: Arc<dyn QueryCache>,
    options: SearchOptions,
    seen: SeenTable,
}

impl TreeEvaluator {
    /// Create an evaluator with its own seen table.
    pub fn new(backend: Arc<dyn SearchBackend>, cache: Arc<dyn QueryCache>) -> Self {
        TreeEvaluator {
            backend,
            cache,
            options: SearchOptions::default(),
            seen: new_seen_table(),
        }
    }

    /// Set the backend execution options.
    pub fn with_options(mut self, options: SearchOptions) -> Self {
        self.options = options;
        self
    }

    /// Share a seen table with other evaluators in the same round.
    pub fn with_seen_table(mut self, seen: SeenTable) -> Self {
        self.seen = seen;
        self
    }

    /// The backend this evaluator executes against.
    pub fn backend(&self) -> &Arc<dyn SearchBackend> {
        &self.backend
    }

    /// Resolve a query into a logical tree.
    ///
    /// A backend failure for any leaf aborts the whole tree; a boolean
    /// clause with no children is a fatal structural error.
    pub fn evaluate(&self, query: &QueryNode) -> Result<Arc<LogicalNode>> {
        let fingerprint = query.fingerprint();

        if let Some(node) = self.seen.read().get(&fingerprint) {
            return Ok(Arc::clone(node));
        }

        if let Some(entry) = self.cache.get(&fingerprint)? {
            debug!("cache hit for {fingerprint}");
            let node = Arc::new(Self::restore(query, fingerprint, entry));
            self.seen.write().insert(fingerprint, Arc::clone(&node));
            return Ok(node);
        }

        let node = Arc::new(self.resolve(query, fingerprint)?);
        self.cache.set(
            &fingerprint,
            CacheEntry::new(query.clone(), node.docs().to_scored_docs()),
        )?;
        self.seen.write().insert(fingerprint, Arc::clone(&node));
        Ok(node)
    }

    /// Rebuild a node from a cached entry, classified by query shape.
    fn restore(query: &QueryNode, fingerprint: Fingerprint, entry: CacheEntry) -> LogicalNode {
        let docs = DocSet::from_scored(entry.docs);
        match query {
            QueryNode::Keyword(k) => LogicalNode::Atom {
                keyword: k.clone(),
                fingerprint,
                docs,
            },
            QueryNode::Boolean(b) if b.operator.is_adjacency() => LogicalNode::AdjAtom {
                query: query.clone(),
                fingerprint,
                docs,
            },
            QueryNode::Boolean(b) => LogicalNode::Combinator {
                op: CombineOp::from_operator(b.operator),
                query: query.clone(),
                fingerprint,
                children: Vec::new(),
                docs,
            },
        }
    }

    fn resolve(&self, query: &QueryNode, fingerprint: Fingerprint) -> Result<LogicalNode> {
        match query {
            QueryNode::Keyword(k) => {
                let docs = self.backend.execute(query, &self.options)?;
                Ok(LogicalNode::Atom {
                    keyword: k.clone(),
                    fingerprint,
                    docs: DocSet::from_scored(docs),
                })
            }
            QueryNode::Boolean(b) if b.operator.is_adjacency() => {
                // Executed verbatim, never decomposed.
                let docs = self.backend.execute(query, &self.options)?;
                Ok(LogicalNode::AdjAtom {
                    query: query.clone(),
                    fingerprint,
                    docs: DocSet::from_scored(docs),
                })
            }
            QueryNode::Boolean(b) => {
                if b.children.is_empty() {
                    return Err(QuarrelError::structural(
                        "boolean clause with no children",
                    ));
                }

                let mut children = Vec::with_capacity(b.children.len());
                for child in &b.children {
                    children.push(self.evaluate(child)?);
                }

                let op = CombineOp::from_operator(b.operator);
                let docs = op.combine(&children);
                Ok(LogicalNode::Combinator {
                    op,
                    query: query.clone(),
                    fingerprint,
                    children,
                    docs,
                })
            }
        }
    }
}
