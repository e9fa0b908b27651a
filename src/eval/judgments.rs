//! Relevance judgments for one topic.

use std::collections::HashMap;

use ahash::RandomState;
use serde::{Deserialize, Serialize};

/// Graded relevance judgments for a topic. A grade above zero counts as
/// relevant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryJudgments {
    /// The topic these judgments belong to.
    pub topic: String,
    grades: HashMap<String, f64, RandomState>,
}

impl QueryJudgments {
    /// Create empty judgments for a topic.
    pub fn new<S: Into<String>>(topic: S) -> Self {
        QueryJudgments {
            topic: topic.into(),
            grades: HashMap::default(),
        }
    }

    /// Build judgments from (document id, grade) pairs.
    pub fn from_pairs<S: Into<String>>(topic: S, pairs: Vec<(&str, f64)>) -> Self {
        let mut judgments = QueryJudgments::new(topic);
        for (doc_id, grade) in pairs {
            judgments.add(doc_id, grade);
        }
        judgments
    }

    /// Record a judgment.
    pub fn add(&mut self, doc_id: &str, grade: f64) {
        self.grades.insert(doc_id.to_string(), grade);
    }

    /// Grade of a document, if judged.
    pub fn grade(&self, doc_id: &str) -> Option<f64> {
        self.grades.get(doc_id).copied()
    }

    /// Whether a document is judged relevant.
    pub fn is_relevant(&self, doc_id: &str) -> bool {
        self.grade(doc_id).is_some_and(|g| g > 0.0)
    }

    /// Number of relevant documents.
    pub fn relevant_count(&self) -> usize {
        self.grades.values().filter(|g| **g > 0.0).count()
    }

    /// Number of judged documents.
    pub fn len(&self) -> usize {
        self.grades.len()
    }

    /// Whether any documents are judged.
    pub fn is_empty(&self) -> bool {
        self.grades.is_empty()
    }
}
