//! Integration tests for the fusion engine.
//!
//! These tests drive `FusionEngine::search` end to end with scripted
//! in-memory backends (no network calls): validation, degradation when one
//! source fails or hangs, total-failure reporting, and ranking scenarios.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use hybrid_search::{
    EmbeddingCache, EmbeddingProvider, FusionEngine, FusionWeights, RetrievalBackend, RetrievalHit,
    RetrievalSource, SearchConfig, SearchError,
};

/// What a scripted call does.
#[derive(Clone)]
enum Script {
    Hits(Vec<RetrievalHit>),
    Fail(&'static str),
    Hang,
}

impl Script {
    async fn run(&self) -> Result<Vec<RetrievalHit>, SearchError> {
        match self {
            Self::Hits(hits) => Ok(hits.clone()),
            Self::Fail(msg) => Err(SearchError::Backend((*msg).to_string())),
            Self::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(Vec::new())
            }
        }
    }
}

struct ScriptedBackend {
    lexical: Script,
    vector: Script,
    lexical_calls: AtomicUsize,
    vector_calls: AtomicUsize,
}

impl ScriptedBackend {
    fn new(lexical: Script, vector: Script) -> Self {
        Self {
            lexical,
            vector,
            lexical_calls: AtomicUsize::new(0),
            vector_calls: AtomicUsize::new(0),
        }
    }
}

impl RetrievalBackend for ScriptedBackend {
    async fn lexical_search(&self, _query: &str, _limit: usize) -> Result<Vec<RetrievalHit>, SearchError> {
        self.lexical_calls.fetch_add(1, Ordering::SeqCst);
        self.lexical.run().await
    }

    async fn vector_search(&self, vector: &[f32], _limit: usize) -> Result<Vec<RetrievalHit>, SearchError> {
        assert!(!vector.is_empty(), "engine must pass the embedding through");
        self.vector_calls.fetch_add(1, Ordering::SeqCst);
        self.vector.run().await
    }
}

struct ScriptedEmbedder {
    fail: bool,
    calls: AtomicUsize,
}

impl ScriptedEmbedder {
    fn working() -> Self {
        Self {
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    fn broken() -> Self {
        Self {
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }
}

impl EmbeddingProvider for ScriptedEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(SearchError::ModelUnavailable("model unavailable".into()));
        }
        Ok(vec![text.len() as f32, 1.0, 0.5])
    }
}

fn engine(
    backend: ScriptedBackend,
    embedder: ScriptedEmbedder,
) -> FusionEngine<ScriptedBackend, ScriptedEmbedder> {
    let config = SearchConfig {
        timeout_seconds: 10,
        ..Default::default()
    };
    FusionEngine::new(backend, EmbeddingCache::new(embedder, 100), config).expect("engine")
}

fn hit(id: &str, score: f64, title: &str) -> RetrievalHit {
    RetrievalHit::new(id, score, title)
}

fn ids(results: &[hybrid_search::RankedResult]) -> Vec<&str> {
    results.iter().map(|r| r.document_id.as_str()).collect()
}

#[tokio::test]
async fn biker_jacket_scenario_ranks_exact_title_first() {
    let backend = ScriptedBackend::new(
        Script::Hits(vec![
            hit("1", 4.0, "Black Leather Biker Jacket"),
            hit("2", 1.0, "Blue Summer Dress"),
        ]),
        Script::Hits(vec![hit("1", 0.9, "Black Leather Biker Jacket")]),
    );
    let engine = engine(backend, ScriptedEmbedder::working());

    let results = engine
        .search("black leather biker jacket", 5)
        .await
        .expect("search");

    assert_eq!(ids(&results), vec!["1", "2"]);
    assert!(results[0].final_score > results[1].final_score);
    assert_eq!(results[0].explain.phrase, FusionWeights::default().phrase);
    assert_eq!(results[1].explain.phrase, 0.0);
    assert_eq!(
        results[0].sources,
        vec![RetrievalSource::Vector, RetrievalSource::Lexical]
    );
}

#[tokio::test]
async fn vector_failure_degrades_to_lexical_results() {
    let backend = ScriptedBackend::new(
        Script::Hits(vec![
            hit("10", 3.0, "Red Dress"),
            hit("11", 1.5, "Red Summer Dress"),
        ]),
        Script::Fail("knn unavailable"),
    );
    let engine = engine(backend, ScriptedEmbedder::working());

    let results = engine.search("red dress", 5).await.expect("lexical-only search");

    assert_eq!(ids(&results), vec!["10", "11"]);
    for result in &results {
        assert_eq!(result.explain.semantic, 0.0);
        assert_eq!(result.sources, vec![RetrievalSource::Lexical]);
    }
}

#[tokio::test]
async fn embedding_failure_degrades_and_skips_knn_call() {
    let backend = ScriptedBackend::new(
        Script::Hits(vec![hit("10", 3.0, "Red Dress")]),
        Script::Hits(vec![hit("99", 0.9, "Should Not Appear")]),
    );
    let engine = engine(backend, ScriptedEmbedder::broken());

    let results = engine.search("red dress", 5).await.expect("search");

    assert_eq!(ids(&results), vec!["10"]);
    assert_eq!(engine.backend().vector_calls.load(Ordering::SeqCst), 0);
    assert_eq!(engine.embeddings().stats().misses, 1);
}

#[tokio::test]
async fn lexical_failure_keeps_vector_results() {
    let backend = ScriptedBackend::new(
        Script::Fail("index closed"),
        Script::Hits(vec![hit("5", 0.8, "Leather Boots")]),
    );
    let engine = engine(backend, ScriptedEmbedder::working());

    let results = engine.search("leather boots", 3).await.expect("vector-only search");

    assert_eq!(ids(&results), vec!["5"]);
    assert!(results[0].explain.semantic > 0.0);
}

#[tokio::test]
async fn both_sources_failing_reports_backend_unavailable() {
    let backend = ScriptedBackend::new(Script::Fail("index closed"), Script::Fail("knn unavailable"));
    let engine = engine(backend, ScriptedEmbedder::working());

    let err = engine.search("red dress", 5).await.unwrap_err();

    assert!(matches!(err, SearchError::BackendUnavailable(_)));
    let message = err.to_string();
    assert!(message.contains("lexical: backend error: index closed"));
    assert!(message.contains("vector: backend error: knn unavailable"));
}

#[tokio::test]
async fn both_sources_empty_is_not_an_empty_success() {
    let backend = ScriptedBackend::new(Script::Hits(vec![]), Script::Hits(vec![]));
    let engine = engine(backend, ScriptedEmbedder::working());

    let err = engine.search("unobtainium", 5).await.unwrap_err();

    assert!(matches!(err, SearchError::BackendUnavailable(_)));
    assert!(err.to_string().contains("no hits"));
}

#[tokio::test]
async fn whitespace_query_rejected_before_any_call() {
    let backend = ScriptedBackend::new(Script::Hits(vec![hit("1", 1.0, "x")]), Script::Hits(vec![]));
    let engine = engine(backend, ScriptedEmbedder::working());

    let err = engine.search("   ", 5).await.unwrap_err();

    assert!(matches!(err, SearchError::InvalidArgument(_)));
    assert_eq!(engine.backend().lexical_calls.load(Ordering::SeqCst), 0);
    assert_eq!(engine.embeddings().provider().calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn out_of_range_k_rejected() {
    let backend = ScriptedBackend::new(Script::Hits(vec![hit("1", 1.0, "x")]), Script::Hits(vec![]));
    let engine = engine(backend, ScriptedEmbedder::working());

    for k in [0, 51] {
        let err = engine.search("dress", k).await.unwrap_err();
        assert!(matches!(err, SearchError::InvalidArgument(_)), "k = {k}");
    }
    assert_eq!(engine.backend().lexical_calls.load(Ordering::SeqCst), 0);
    assert_eq!(engine.backend().vector_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn hanging_lexical_call_times_out_and_degrades() {
    let backend = ScriptedBackend::new(Script::Hang, Script::Hits(vec![hit("7", 0.6, "Wool Scarf")]));
    let engine = engine(backend, ScriptedEmbedder::working());

    let results = engine.search("wool scarf", 5).await.expect("search");

    assert_eq!(ids(&results), vec!["7"]);
}

#[tokio::test(start_paused = true)]
async fn hanging_sources_both_time_out() {
    let backend = ScriptedBackend::new(Script::Hang, Script::Hang);
    let engine = engine(backend, ScriptedEmbedder::working());

    let err = engine.search("wool scarf", 5).await.unwrap_err();

    assert!(matches!(err, SearchError::BackendUnavailable(_)));
    assert!(err.to_string().contains("timed out"));
}

#[tokio::test]
async fn repeated_query_reuses_cached_embedding() {
    let backend = ScriptedBackend::new(
        Script::Hits(vec![hit("1", 2.0, "Denim Jacket")]),
        Script::Hits(vec![hit("1", 0.7, "Denim Jacket")]),
    );
    let engine = engine(backend, ScriptedEmbedder::working());

    engine.search("denim jacket", 5).await.expect("first");
    engine.search("denim jacket", 5).await.expect("second");

    assert_eq!(engine.embeddings().provider().calls.load(Ordering::SeqCst), 1);
    let stats = engine.embeddings().stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
}

#[tokio::test]
async fn result_count_capped_at_k() {
    let lexical: Vec<RetrievalHit> = (0..30i32)
        .map(|i| hit(&format!("d{i}"), 30.0 - f64::from(i), "Cotton T-Shirt"))
        .collect();
    let backend = ScriptedBackend::new(Script::Hits(lexical), Script::Hits(vec![]));
    let engine = engine(backend, ScriptedEmbedder::working());

    let results = engine.search("cotton t-shirt", 10).await.expect("search");

    assert_eq!(results.len(), 10);
    assert_eq!(results[0].document_id, "d0");
}

#[tokio::test]
async fn unrelated_vector_match_ranks_below_lexical_match() {
    let backend = ScriptedBackend::new(
        Script::Hits(vec![hit("lex", 2.0, "Leather Jacket")]),
        Script::Hits(vec![
            hit("vec", 3.0, "Garden Hose Reel"),
            hit("lex", 0.5, "Leather Jacket"),
        ]),
    );
    let engine = engine(backend, ScriptedEmbedder::working());

    let results = engine.search("leather jacket", 5).await.expect("search");

    assert_eq!(ids(&results), vec!["lex", "vec"]);
    let unrelated = &results[1];
    assert!(unrelated.explain.lexical < 0.0, "no-overlap penalty applies");
}

#[tokio::test]
async fn serialized_results_carry_rounded_explain() {
    let backend = ScriptedBackend::new(
        Script::Hits(vec![hit("1", 4.0, "Black Leather Jacket")]),
        Script::Hits(vec![hit("1", 0.9, "Black Leather Jacket")]),
    );
    let engine = engine(backend, ScriptedEmbedder::working());

    let results = engine.search("black leather jacket", 1).await.expect("search");
    let json = serde_json::to_value(&results).expect("serialize");

    let semantic = json[0]["explain"]["semantic"].as_f64().expect("semantic");
    assert!((semantic * 10_000.0 - (semantic * 10_000.0).round()).abs() < 1e-6);
    assert_eq!(json[0]["document_id"], "1");
}

#[tokio::test]
async fn blank_id_hits_alone_report_backend_unavailable() {
    let backend = ScriptedBackend::new(
        Script::Hits(vec![hit(" ", 3.0, "x")]),
        Script::Hits(vec![hit("", 0.9, "y")]),
    );
    let engine = engine(backend, ScriptedEmbedder::working());

    let err = engine.search("dress", 5).await.unwrap_err();

    assert!(matches!(err, SearchError::BackendUnavailable(_)));
}

#[tokio::test]
async fn blank_id_hit_does_not_lower_top_lexical_score() {
    let backend = ScriptedBackend::new(
        Script::Hits(vec![hit("  ", 10.0, "Blank"), hit("1", 4.0, "Red Dress")]),
        Script::Hits(vec![]),
    );
    let engine = engine(backend, ScriptedEmbedder::working());

    let results = engine.search("red dress", 5).await.expect("search");

    assert_eq!(ids(&results), vec!["1"]);
    // Normalized lexical score 1.0 and full overlap.
    let keyword = FusionWeights::default().keyword;
    assert!((results[0].explain.lexical - keyword).abs() < 1e-12);
}

#[tokio::test]
async fn surrounding_whitespace_is_a_distinct_cache_key() {
    let backend = ScriptedBackend::new(
        Script::Hits(vec![hit("1", 2.0, "Denim Jacket")]),
        Script::Hits(vec![hit("1", 0.7, "Denim Jacket")]),
    );
    let engine = engine(backend, ScriptedEmbedder::working());

    engine.search(" jacket", 5).await.expect("padded");
    engine.search("jacket", 5).await.expect("bare");

    assert_eq!(engine.embeddings().provider().calls.load(Ordering::SeqCst), 2);
    assert_eq!(engine.embeddings().stats().misses, 2);
    assert!(engine.embeddings().contains(" jacket"));
    assert!(engine.embeddings().contains("jacket"));
}

#[tokio::test]
async fn padded_query_still_earns_phrase_signal() {
    let backend = ScriptedBackend::new(
        Script::Hits(vec![hit("1", 2.0, "Black Leather Jacket")]),
        Script::Hits(vec![]),
    );
    let engine = engine(backend, ScriptedEmbedder::working());

    let results = engine.search("  Leather Jacket  ", 5).await.expect("search");

    assert_eq!(results[0].explain.phrase, FusionWeights::default().phrase);
}
