//! End-to-end refinement scenarios over the in-memory backend.

use std::sync::Arc;

use quarrel::backend::MemoryBackend;
use quarrel::cache::MemoryCache;
use quarrel::eval::{QueryJudgments, Recall};
use quarrel::features::default_measurements;
use quarrel::logical::TreeEvaluator;
use quarrel::query::{Keyword, QueryNode, fields};
use quarrel::refine::{ChainDriver, RefineConfig};
use quarrel::select::{OracleSelector, RankOracleSelector};
use quarrel::transform::{
    CandidateQuery, StaticSimilarity, TransformationEngine, TransformationEngineConfig,
    TransformationId, default_transformers,
};

/// A collection where the useful "stroke" signal lives in abstracts, not
/// titles.
fn field_swap_backend() -> Arc<MemoryBackend> {
    let backend = MemoryBackend::new();
    // Title matches are editorial noise.
    backend.add_document("d1", fields::TITLE, "stroke care awareness");
    backend.add_document("d1", fields::ABSTRACT, "survey of therapy access");
    backend.add_document("d2", fields::TITLE, "stroke units in europe");
    backend.add_document("d2", fields::ABSTRACT, "organisation of therapy wards");
    // Abstract matches are the trials we want.
    backend.add_document("d3", fields::TITLE, "early mobilisation trial");
    backend.add_document("d3", fields::ABSTRACT, "stroke patients under therapy");
    backend.add_document("d4", fields::TITLE, "rehabilitation outcomes");
    backend.add_document("d4", fields::ABSTRACT, "therapy after acute stroke");
    Arc::new(backend)
}

fn engine_for(backend: Arc<MemoryBackend>) -> Arc<TransformationEngine> {
    let provider = Arc::new(StaticSimilarity::new());
    Arc::new(
        TransformationEngine::new(
            backend,
            default_transformers(provider, 0.7),
            default_measurements(),
            TransformationEngineConfig::default(),
        )
        .unwrap(),
    )
}

#[test]
fn test_oracle_adopts_field_swap() {
    let backend = field_swap_backend();
    let engine = engine_for(Arc::clone(&backend));
    let tree = Arc::new(TreeEvaluator::new(
        Arc::clone(&backend) as _,
        Arc::new(MemoryCache::new()),
    ));

    let judgments = QueryJudgments::from_pairs("stroke-1", vec![("d3", 1.0), ("d4", 1.0)]);
    let mut selector = OracleSelector::new(tree, judgments, 4);

    // Title-restricted seed retrieves only the two irrelevant documents.
    let seed = CandidateQuery::seed(
        "stroke-1",
        QueryNode::and(vec![
            QueryNode::Keyword(Keyword::new("stroke").with_field(fields::TITLE)),
            QueryNode::keyword("therapy"),
        ]),
    );

    let driver = ChainDriver::new(engine).with_config(RefineConfig { max_rounds: 4 });
    let outcome = driver.refine(&seed, &mut selector).unwrap();

    // The field swap keeps the retrieval budget (two documents) while
    // turning both into relevant ones.
    assert_eq!(
        outcome.adopted.query.canonical(),
        "AND(stroke[ab],therapy)"
    );
    assert_eq!(
        outcome.adopted.transformation,
        Some(TransformationId::FieldRestrictions)
    );
    assert_eq!(outcome.adopted.depth(), 1);
    assert_eq!(outcome.history.len(), outcome.rounds);
}

#[test]
fn test_rank_oracle_improves_recall() {
    let backend = field_swap_backend();
    let engine = engine_for(Arc::clone(&backend));
    let tree = Arc::new(TreeEvaluator::new(
        Arc::clone(&backend) as _,
        Arc::new(MemoryCache::new()),
    ));

    let judgments = QueryJudgments::from_pairs("stroke-1", vec![("d3", 1.0), ("d4", 1.0)]);
    let mut selector = RankOracleSelector::new(tree, Arc::new(Recall), judgments, 3);

    let seed = CandidateQuery::seed(
        "stroke-1",
        QueryNode::and(vec![
            QueryNode::Keyword(Keyword::new("stroke").with_field(fields::TITLE)),
            QueryNode::keyword("therapy"),
        ]),
    );

    let driver = ChainDriver::new(engine).with_config(RefineConfig { max_rounds: 3 });
    let outcome = driver.refine(&seed, &mut selector).unwrap();

    // Recall over the judged set reaches 1.0 somewhere in the chain.
    let tree = TreeEvaluator::new(Arc::clone(&backend) as _, Arc::new(MemoryCache::new()));
    let node = tree.evaluate(&outcome.adopted.query).unwrap();
    let judged = [
        node.docs().contains("d3"),
        node.docs().contains("d4"),
    ];
    assert!(judged.iter().all(|present| *present));
}

#[test]
fn test_generation_round_produces_exact_flips() {
    let backend = field_swap_backend();
    let engine = engine_for(backend);

    let seed = CandidateQuery::seed(
        "t",
        QueryNode::and(vec![
            QueryNode::or(vec![QueryNode::keyword("a"), QueryNode::keyword("b")]),
            QueryNode::keyword("c"),
        ]),
    );

    let candidates = engine.generate(&seed).unwrap();
    let canonicals: Vec<String> = candidates.iter().map(|c| c.query.canonical()).collect();

    assert!(canonicals.contains(&"OR(OR(a,b),c)".to_string()));
    assert!(canonicals.contains(&"AND(AND(a,b),c)".to_string()));

    // Exactly one edit per candidate, never two.
    for candidate in &candidates {
        let distance = QueryNode::edit_distance(&seed.query, &candidate.query);
        if candidate.transformation.is_some() {
            assert_eq!(distance, 1, "multi-edit candidate: {}", candidate.query);
        } else {
            assert_eq!(distance, 0);
        }
    }
    assert!(!canonicals.contains(&"OR(AND(a,b),c)".to_string()));
}
