//! Parallel single-edit variant generation.

use std::collections::HashSet;
use std::sync::Arc;

use log::{debug, warn};
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::backend::{RetryPolicy, SearchBackend};
use crate::error::{QuarrelError, Result};
use crate::features::{Feature, FeatureRegistry, FeatureSet, Measurement};
use crate::query::QueryNode;
use crate::transform::candidate::CandidateQuery;
use crate::transform::context::TransformationContext;
use crate::transform::{TransformationId, Transformer};

/// Configuration for the transformation engine.
#[derive(Debug, Clone)]
pub struct TransformationEngineConfig {
    /// Worker threads for per-operator fan-out. `None` uses the number of
    /// CPU cores.
    pub thread_pool_size: Option<usize>,
    /// Retry policy for backend-touching measurement calls.
    pub retry: RetryPolicy,
}

impl Default for TransformationEngineConfig {
    fn default() -> Self {
        TransformationEngineConfig {
            thread_pool_size: None,
            retry: RetryPolicy::default(),
        }
    }
}

/// Generates all single-edit variants of a candidate.
///
/// One worker task runs per transformation operator; each task recursively
/// walks the query, applies its operator at every applicable position, and
/// builds the variant's feature vector (measurements, measurement deltas,
/// structural context, and the categorical operator feature). Results are
/// pooled, ordered by catalog position, and de-duplicated by fingerprint.
#[derive(Debug)]
pub struct TransformationEngine {
    backend: Arc<dyn SearchBackend>,
    transformers: Vec<Arc<dyn Transformer>>,
    measurements: Vec<Arc<dyn Measurement>>,
    registry: Arc<FeatureRegistry>,
    pool: ThreadPool,
    config: TransformationEngineConfig,
}

impl TransformationEngine {
    /// Assemble an engine, registering every feature name it will emit.
    pub fn new(
        backend: Arc<dyn SearchBackend>,
        transformers: Vec<Arc<dyn Transformer>>,
        measurements: Vec<Arc<dyn Measurement>>,
        config: TransformationEngineConfig,
    ) -> Result<Self> {
        let mut registry = FeatureRegistry::new();
        for measurement in &measurements {
            registry.register(format!("m:{}", measurement.name()));
            registry.register(format!("delta:{}", measurement.name()));
        }
        registry.register("ctx:depth");
        registry.register("ctx:clause_type");
        registry.register("ctx:children_count");
        registry.register("op:id");

        let threads = config.thread_pool_size.unwrap_or_else(num_cpus::get);
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("transform-{i}"))
            .build()
            .map_err(|e| QuarrelError::other(format!("failed to create thread pool: {e}")))?;

        Ok(TransformationEngine {
            backend,
            transformers,
            measurements,
            registry: Arc::new(registry),
            pool,
            config,
        })
    }

    /// The feature registry populated at construction.
    pub fn registry(&self) -> &Arc<FeatureRegistry> {
        &self.registry
    }

    /// The backend measurements execute against.
    pub fn backend(&self) -> &Arc<dyn SearchBackend> {
        &self.backend
    }

    /// Generate all single-edit variants of `seed`, plus the unmodified
    /// baseline, de-duplicated by fingerprint.
    pub fn generate(&self, seed: &CandidateQuery) -> Result<Vec<CandidateQuery>> {
        let pre = self.measure_all(&seed.query)?;

        let (tx, rx) = crossbeam_channel::unbounded();
        let pre_ref = &pre;
        self.pool.scope(|scope| {
            for (slot, transformer) in self.transformers.iter().enumerate() {
                let tx = tx.clone();
                scope.spawn(move |_| {
                    let result = self.candidates_for(transformer.as_ref(), seed, pre_ref);
                    let _ = tx.send((slot, result));
                });
            }
        });
        drop(tx);

        let mut slots: Vec<Option<Result<Vec<CandidateQuery>>>> =
            (0..self.transformers.len()).map(|_| None).collect();
        for (slot, result) in rx.iter() {
            slots[slot] = Some(result);
        }

        let mut pooled = vec![self.baseline(seed, &pre)];
        for slot in slots {
            let batch = slot.ok_or_else(|| {
                QuarrelError::ThreadJoinError("variant generation task vanished".to_string())
            })??;
            pooled.extend(batch);
        }

        // Round-local de-duplication of identical variants, keep-first.
        let mut seen = HashSet::new();
        pooled.retain(|candidate| seen.insert(candidate.fingerprint()));

        debug!(
            "generated {} candidates for topic {}",
            pooled.len(),
            seed.topic
        );
        Ok(pooled)
    }

    /// Variants of a whole query for one operator.
    fn candidates_for(
        &self,
        transformer: &dyn Transformer,
        seed: &CandidateQuery,
        pre: &[f64],
    ) -> Result<Vec<CandidateQuery>> {
        let root = TransformationContext::root(seed.query.children().len());
        let variants = Self::recurse(transformer, &seed.query, root)?;

        let mut out = Vec::with_capacity(variants.len());
        for (variant, context) in variants {
            match self.features_for(&variant, pre, context, transformer.id()) {
                Ok(features) => out.push(CandidateQuery::derived(
                    seed,
                    transformer.id(),
                    variant,
                    features,
                )),
                Err(err) => {
                    // One failing candidate does not fail the round.
                    warn!(
                        "skipping {} candidate {}: {err}",
                        transformer.name(),
                        variant.canonical()
                    );
                }
            }
        }
        Ok(out)
    }

    /// Apply one operator at every position of the tree: at the node
    /// itself, and to each child with its siblings held fixed, re-wrapped
    /// into a copy of the parent with exactly that child replaced.
    fn recurse(
        transformer: &dyn Transformer,
        node: &QueryNode,
        context: TransformationContext,
    ) -> Result<Vec<(QueryNode, TransformationContext)>> {
        let mut out: Vec<(QueryNode, TransformationContext)> = transformer
            .apply(node)?
            .into_iter()
            .map(|variant| (variant, context))
            .collect();

        if let QueryNode::Boolean(clause) = node {
            for (index, child) in clause.children.iter().enumerate() {
                let child_context = context.descend(clause.operator, child.children().len());
                for (variant, variant_context) in
                    Self::recurse(transformer, child, child_context)?
                {
                    out.push((
                        QueryNode::Boolean(clause.with_child_replaced(index, variant)),
                        variant_context,
                    ));
                }
            }
        }
        Ok(out)
    }

    fn measure_all(&self, query: &QueryNode) -> Result<Vec<f64>> {
        self.measurements
            .iter()
            .map(|m| {
                self.config
                    .retry
                    .run(m.name(), || m.measure(query, self.backend.as_ref()))
            })
            .collect()
    }

    fn features_for(
        &self,
        variant: &QueryNode,
        pre: &[f64],
        context: TransformationContext,
        transformation: TransformationId,
    ) -> Result<FeatureSet> {
        let post = self.measure_all(variant)?;
        Ok(self.assemble_features(&post, pre, context, transformation.ordinal()))
    }

    fn assemble_features(
        &self,
        post: &[f64],
        pre: &[f64],
        context: TransformationContext,
        operator_ordinal: u32,
    ) -> FeatureSet {
        let mut features = FeatureSet::new();
        for (measurement, (post_value, pre_value)) in
            self.measurements.iter().zip(post.iter().zip(pre.iter()))
        {
            let name = measurement.name();
            if let Some(id) = self.registry.id(&format!("m:{name}")) {
                features.insert(Feature::new(id, *post_value));
            }
            if let Some(id) = self.registry.id(&format!("delta:{name}")) {
                features.insert(Feature::new(id, post_value - pre_value));
            }
        }
        if let Some(id) = self.registry.id("ctx:depth") {
            features.insert(Feature::new(id, context.depth as f64));
        }
        if let Some(id) = self.registry.id("ctx:clause_type") {
            features.insert(Feature::new(id, context.clause_type.ordinal() as f64));
        }
        if let Some(id) = self.registry.id("ctx:children_count") {
            features.insert(Feature::new(id, context.children_count as f64));
        }
        if let Some(id) = self.registry.id("op:id") {
            features.insert(Feature::new(id, operator_ordinal as f64));
        }
        features
    }

    /// The unmodified seed as a baseline candidate: zero deltas, root
    /// context, operator ordinal 0.
    fn baseline(&self, seed: &CandidateQuery, pre: &[f64]) -> CandidateQuery {
        let context = TransformationContext::root(seed.query.children().len());
        let features = self.assemble_features(pre, pre, context, 0);
        CandidateQuery::baseline(seed, features)
    }
}
