//! Resolved logical tree nodes and their document sets.

use std::collections::HashMap;
use std::sync::Arc;

use ahash::RandomState;

use crate::backend::ScoredDoc;
use crate::logical::combine::CombineOp;
use crate::query::{Fingerprint, Keyword, QueryNode};

/// A set of retrieved documents keyed by document id.
///
/// Membership is by id alone; when the same id arrives with different
/// scores the maximum is kept.
#[derive(Debug, Clone, Default)]
pub struct DocSet {
    docs: HashMap<String, f32, RandomState>,
}

impl DocSet {
    /// Create an empty set.
    pub fn new() -> Self {
        DocSet::default()
    }

    /// Build a set from ranked backend results.
    pub fn from_scored(docs: impl IntoIterator<Item = ScoredDoc>) -> Self {
        let mut set = DocSet::new();
        for doc in docs {
            set.insert_max(doc.doc_id, doc.score);
        }
        set
    }

    /// Insert an id, keeping the maximum score on duplicates.
    pub fn insert_max(&mut self, doc_id: String, score: f32) {
        self.docs
            .entry(doc_id)
            .and_modify(|s| *s = s.max(score))
            .or_insert(score);
    }

    /// Number of documents.
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Whether the set contains an id.
    pub fn contains(&self, doc_id: &str) -> bool {
        self.docs.contains_key(doc_id)
    }

    /// Score of an id, if present.
    pub fn score(&self, doc_id: &str) -> Option<f32> {
        self.docs.get(doc_id).copied()
    }

    /// Iterate over (id, score) pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &f32)> {
        self.docs.iter()
    }

    /// Render as a ranked list, score descending then id ascending.
    pub fn to_scored_docs(&self) -> Vec<ScoredDoc> {
        let mut out: Vec<ScoredDoc> = self
            .docs
            .iter()
            .map(|(id, score)| ScoredDoc::new(id.clone(), *score))
            .collect();
        out.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.doc_id.cmp(&b.doc_id))
        });
        out
    }

    /// N-way intersection: ids present in every set.
    pub fn intersect_all(sets: &[&DocSet]) -> DocSet {
        let mut out = DocSet::new();
        let (first, rest) = match sets.split_first() {
            Some(split) => split,
            None => return out,
        };
        for (id, score) in first.iter() {
            if rest.iter().all(|set| set.contains(id)) {
                let score = rest
                    .iter()
                    .filter_map(|set| set.score(id))
                    .fold(*score, f32::max);
                out.insert_max(id.clone(), score);
            }
        }
        out
    }

    /// Union of all sets.
    pub fn union_all(sets: &[&DocSet]) -> DocSet {
        let mut out = DocSet::new();
        for set in sets {
            for (id, score) in set.iter() {
                out.insert_max(id.clone(), *score);
            }
        }
        out
    }

    /// Relative complement: the first set minus the union of the rest.
    pub fn complement(sets: &[&DocSet]) -> DocSet {
        let mut out = DocSet::new();
        let (first, rest) = match sets.split_first() {
            Some(split) => split,
            None => return out,
        };
        for (id, score) in first.iter() {
            if !rest.iter().any(|set| set.contains(id)) {
                out.insert_max(id.clone(), *score);
            }
        }
        out
    }
}

/// A node of a resolved logical tree.
///
/// Mirrors the query AST: keyword leaves become `Atom`s, ADJ*n* subtrees
/// become `AdjAtom`s executed verbatim, and the remaining boolean clauses
/// become `Combinator`s whose documents are exactly the combination of
/// their children's. Nodes are immutable once built.
#[derive(Debug)]
pub enum LogicalNode {
    /// A resolved keyword leaf.
    Atom {
        keyword: Keyword,
        fingerprint: Fingerprint,
        docs: DocSet,
    },
    /// An ADJ*n* subtree executed as one atomic backend query.
    AdjAtom {
        query: QueryNode,
        fingerprint: Fingerprint,
        docs: DocSet,
    },
    /// A combined internal node.
    ///
    /// `children` is empty when the node was restored from a cache hit;
    /// freshly combined nodes always carry their resolved children.
    Combinator {
        op: CombineOp,
        query: QueryNode,
        fingerprint: Fingerprint,
        children: Vec<Arc<LogicalNode>>,
        docs: DocSet,
    },
}

impl LogicalNode {
    /// The node's fingerprint.
    pub fn fingerprint(&self) -> &Fingerprint {
        match self {
            LogicalNode::Atom { fingerprint, .. }
            | LogicalNode::AdjAtom { fingerprint, .. }
            | LogicalNode::Combinator { fingerprint, .. } => fingerprint,
        }
    }

    /// The node's resolved document set.
    pub fn docs(&self) -> &DocSet {
        match self {
            LogicalNode::Atom { docs, .. }
            | LogicalNode::AdjAtom { docs, .. }
            | LogicalNode::Combinator { docs, .. } => docs,
        }
    }

    /// The originating query.
    pub fn query(&self) -> QueryNode {
        match self {
            LogicalNode::Atom { keyword, .. } => QueryNode::Keyword(keyword.clone()),
            LogicalNode::AdjAtom { query, .. } | LogicalNode::Combinator { query, .. } => {
                query.clone()
            }
        }
    }

    /// Number of retrieved documents.
    pub fn retrieved_count(&self) -> usize {
        self.docs().len()
    }
}
