//! In-memory positional index backend for tests and local experiments.

use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;

use crate::backend::traits::{ScoredDoc, SearchBackend, SearchOptions};
use crate::error::{QuarrelError, Result};
use crate::query::{BooleanNode, Keyword, Operator, QueryNode};

/// Token positions of a term within one document field.
type Postings = HashMap<String, Vec<u32>>;

#[derive(Debug, Default)]
struct Index {
    /// (field, term) -> doc id -> positions.
    postings: HashMap<(String, String), Postings>,
    /// All indexed field names.
    fields: HashSet<String>,
    /// All document ids.
    docs: HashSet<String>,
    /// MeSH heading -> narrower headings, consulted for exploded keywords.
    narrower: HashMap<String, Vec<String>>,
}

/// An in-process backend over a small document collection.
///
/// Keywords match as phrases against token positions, so ADJ*n* clauses
/// can be executed verbatim. Useful for unit tests and for trying out
/// strategies without a remote service.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    index: RwLock<Index>,
}

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect()
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        MemoryBackend::default()
    }

    /// Index a document field.
    pub fn add_document(&self, doc_id: &str, field: &str, text: &str) {
        let mut index = self.index.write();
        index.docs.insert(doc_id.to_string());
        index.fields.insert(field.to_string());
        for (position, token) in tokenize(text).into_iter().enumerate() {
            index
                .postings
                .entry((field.to_string(), token))
                .or_default()
                .entry(doc_id.to_string())
                .or_default()
                .push(position as u32);
        }
    }

    /// Register narrower headings used when a keyword is exploded.
    pub fn add_narrower(&self, heading: &str, narrower: Vec<&str>) {
        self.index.write().narrower.insert(
            heading.to_lowercase(),
            narrower.into_iter().map(|t| t.to_lowercase()).collect(),
        );
    }

    /// Number of indexed documents.
    pub fn doc_count(&self) -> usize {
        self.index.read().docs.len()
    }

    /// Phrase occurrence start positions per document for `text` in `field`.
    fn phrase_positions(
        index: &Index,
        field: &str,
        text: &str,
        truncated: bool,
    ) -> HashMap<String, Vec<u32>> {
        let tokens = tokenize(text);
        let mut out: HashMap<String, Vec<u32>> = HashMap::new();
        if tokens.is_empty() {
            return out;
        }

        // Candidate postings per token; the last token may be a prefix when
        // the keyword is truncated.
        let mut per_token: Vec<HashMap<String, Vec<u32>>> = Vec::with_capacity(tokens.len());
        for (i, token) in tokens.iter().enumerate() {
            let mut merged: HashMap<String, Vec<u32>> = HashMap::new();
            let last = i == tokens.len() - 1;
            for ((f, term), postings) in &index.postings {
                if f != field {
                    continue;
                }
                let matches = if truncated && last {
                    term.starts_with(token.as_str())
                } else {
                    term == token
                };
                if matches {
                    for (doc, positions) in postings {
                        merged.entry(doc.clone()).or_default().extend(positions);
                    }
                }
            }
            for positions in merged.values_mut() {
                positions.sort_unstable();
            }
            per_token.push(merged);
        }

        for (doc, starts) in &per_token[0] {
            let mut hits = Vec::new();
            'start: for &start in starts {
                for (offset, token_postings) in per_token.iter().enumerate().skip(1) {
                    let wanted = start + offset as u32;
                    match token_postings.get(doc) {
                        Some(positions) if positions.binary_search(&wanted).is_ok() => {}
                        _ => continue 'start,
                    }
                }
                hits.push(start);
            }
            if !hits.is_empty() {
                out.insert(doc.clone(), hits);
            }
        }
        out
    }

    fn keyword_fields(index: &Index, keyword: &Keyword) -> Vec<String> {
        if keyword.fields.is_empty() {
            let mut all: Vec<String> = index.fields.iter().cloned().collect();
            all.sort();
            all
        } else {
            keyword.fields.clone()
        }
    }

    /// Resolve a keyword to doc -> score, following the narrower table when
    /// the keyword is exploded.
    fn eval_keyword(index: &Index, keyword: &Keyword) -> HashMap<String, f32> {
        let mut texts = vec![keyword.text.to_lowercase()];
        if keyword.exploded {
            if let Some(narrower) = index.narrower.get(&keyword.text.to_lowercase()) {
                texts.extend(narrower.iter().cloned());
            }
        }

        let mut out: HashMap<String, f32> = HashMap::new();
        for field in Self::keyword_fields(index, keyword) {
            for text in &texts {
                for (doc, hits) in
                    Self::phrase_positions(index, &field, text, keyword.truncated)
                {
                    *out.entry(doc).or_insert(0.0) += hits.len() as f32;
                }
            }
        }
        out
    }

    fn eval_adjacency(index: &Index, node: &BooleanNode, n: u32) -> Result<HashMap<String, f32>> {
        let mut keywords = Vec::with_capacity(node.children.len());
        for child in &node.children {
            match child {
                QueryNode::Keyword(k) => keywords.push(k),
                QueryNode::Boolean(_) => {
                    return Err(QuarrelError::backend(
                        "adjacency clause over non-keyword children",
                    ));
                }
            }
        }
        if keywords.len() < 2 {
            return Err(QuarrelError::backend("adjacency clause needs two terms"));
        }

        let mut fields: Vec<String> = keywords
            .iter()
            .flat_map(|k| Self::keyword_fields(index, k))
            .collect();
        fields.sort();
        fields.dedup();

        let mut out: HashMap<String, f32> = HashMap::new();
        for field in &fields {
            let per_child: Vec<HashMap<String, Vec<u32>>> = keywords
                .iter()
                .map(|k| Self::phrase_positions(index, field, &k.text, k.truncated))
                .collect();

            'doc: for doc in per_child[0].keys() {
                for pair in per_child.windows(2) {
                    let (left, right) = match (pair[0].get(doc), pair[1].get(doc)) {
                        (Some(l), Some(r)) => (l, r),
                        _ => continue 'doc,
                    };
                    let near = left.iter().any(|&a| {
                        right.iter().any(|&b| a.abs_diff(b) <= n)
                    });
                    if !near {
                        continue 'doc;
                    }
                }
                *out.entry(doc.clone()).or_insert(0.0) += 1.0;
            }
        }
        Ok(out)
    }

    fn eval_node(index: &Index, node: &QueryNode) -> Result<HashMap<String, f32>> {
        match node {
            QueryNode::Keyword(k) => Ok(Self::eval_keyword(index, k)),
            QueryNode::Boolean(b) => {
                if b.children.is_empty() {
                    return Err(QuarrelError::structural("boolean clause with no children"));
                }
                if let Operator::Adj(n) = b.operator {
                    return Self::eval_adjacency(index, b, n);
                }

                let mut resolved = Vec::with_capacity(b.children.len());
                for child in &b.children {
                    resolved.push(Self::eval_node(index, child)?);
                }

                match b.operator {
                    Operator::Or => {
                        let mut out: HashMap<String, f32> = HashMap::new();
                        for child in resolved {
                            for (doc, score) in child {
                                let entry = out.entry(doc).or_insert(0.0);
                                *entry = entry.max(score);
                            }
                        }
                        Ok(out)
                    }
                    Operator::And => {
                        let (first, rest) = resolved.split_first().expect("non-empty");
                        let mut out = first.clone();
                        out.retain(|doc, _| rest.iter().all(|c| c.contains_key(doc)));
                        Ok(out)
                    }
                    Operator::Not => {
                        let (first, rest) = resolved.split_first().expect("non-empty");
                        let mut out = first.clone();
                        out.retain(|doc, _| !rest.iter().any(|c| c.contains_key(doc)));
                        Ok(out)
                    }
                    Operator::Adj(_) => unreachable!("handled above"),
                }
            }
        }
    }
}

impl SearchBackend for MemoryBackend {
    fn execute(&self, query: &QueryNode, options: &SearchOptions) -> Result<Vec<ScoredDoc>> {
        let index = self.index.read();
        let scored = Self::eval_node(&index, query)?;

        let mut results: Vec<ScoredDoc> = scored
            .into_iter()
            .map(|(doc_id, score)| ScoredDoc { doc_id, score })
            .collect();
        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.doc_id.cmp(&b.doc_id))
        });
        results.truncate(options.max_docs);
        Ok(results)
    }

    fn retrieval_size(&self, query: &QueryNode) -> Result<u64> {
        let index = self.index.read();
        Ok(Self::eval_node(&index, query)?.len() as u64)
    }

    fn term_frequency(&self, field: &str, term: &str) -> Result<u64> {
        let index = self.index.read();
        let key = (field.to_string(), term.to_lowercase());
        Ok(index
            .postings
            .get(&key)
            .map(|p| p.values().map(|positions| positions.len() as u64).sum())
            .unwrap_or(0))
    }

    fn document_frequency(&self, field: &str, term: &str) -> Result<u64> {
        let index = self.index.read();
        let key = (field.to_string(), term.to_lowercase());
        Ok(index.postings.get(&key).map(|p| p.len() as u64).unwrap_or(0))
    }

    fn inverse_document_frequency(&self, field: &str, term: &str) -> Result<f64> {
        let df = self.document_frequency(field, term)?;
        if df == 0 {
            return Ok(0.0);
        }
        let n = self.doc_count() as f64;
        Ok((n / df as f64).ln())
    }

    fn vocabulary_size(&self) -> Result<u64> {
        let index = self.index.read();
        let terms: HashSet<&String> = index.postings.keys().map(|(_, term)| term).collect();
        Ok(terms.len() as u64)
    }
}
