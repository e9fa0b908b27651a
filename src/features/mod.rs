//! Feature vectors, the feature registry, and measurement contracts.

pub mod feature;
pub mod learnt;
pub mod measurement;
pub mod registry;

pub use feature::{Feature, FeatureSet};
pub use learnt::LearntFeature;
pub use measurement::{
    BooleanOperatorCount, ClauseCount, KeywordCount, MaxDepth, MeanIdf, Measurement,
    RetrievalSize, default_measurements,
};
pub use registry::FeatureRegistry;
