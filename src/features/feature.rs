//! Sparse feature vectors.

use serde::{Deserialize, Serialize};

/// A single feature: a registry id and its value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Stable feature id from the registry.
    pub id: u32,
    /// Feature value.
    pub score: f64,
}

impl Feature {
    /// Create a feature.
    pub fn new(id: u32, score: f64) -> Self {
        Feature { id, score }
    }
}

/// A sparse feature vector kept sorted by id and de-duplicated keep-first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    features: Vec<Feature>,
}

impl FeatureSet {
    /// Create an empty vector.
    pub fn new() -> Self {
        FeatureSet::default()
    }

    /// Build from arbitrary features; sorts by id and keeps the first
    /// occurrence of each id.
    pub fn from_features(features: Vec<Feature>) -> Self {
        let mut features = features;
        // Stable sort, so the first inserted wins among equal ids.
        features.sort_by_key(|f| f.id);
        features.dedup_by_key(|f| f.id);
        FeatureSet { features }
    }

    /// Insert a feature. An id already present keeps its first value.
    pub fn insert(&mut self, feature: Feature) {
        match self.features.binary_search_by_key(&feature.id, |f| f.id) {
            Ok(_) => {}
            Err(pos) => self.features.insert(pos, feature),
        }
    }

    /// Value of a feature id, if present.
    pub fn get(&self, id: u32) -> Option<f64> {
        self.features
            .binary_search_by_key(&id, |f| f.id)
            .ok()
            .map(|pos| self.features[pos].score)
    }

    /// The features, sorted by id.
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Number of features.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether the vector is empty.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Cosine similarity with another vector over the sparse id space.
    pub fn cosine_similarity(&self, other: &FeatureSet) -> f64 {
        let mut dot = 0.0;
        for feature in &self.features {
            if let Some(value) = other.get(feature.id) {
                dot += feature.score * value;
            }
        }

        let norm_a: f64 = self.features.iter().map(|f| f.score * f.score).sum();
        let norm_b: f64 = other.features.iter().map(|f| f.score * f.score).sum();
        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }
        dot / (norm_a.sqrt() * norm_b.sqrt())
    }

    /// Cosine distance: `1 - similarity`.
    pub fn cosine_distance(&self, other: &FeatureSet) -> f64 {
        1.0 - self.cosine_similarity(other)
    }
}

impl FromIterator<Feature> for FeatureSet {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        FeatureSet::from_features(iter.into_iter().collect())
    }
}
