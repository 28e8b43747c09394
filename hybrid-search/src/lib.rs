//! # hybrid-search
//!
//! Hybrid lexical + vector retrieval with explainable rank fusion.
//!
//! This crate answers free-text product queries by combining a keyword
//! search and a KNN search against the same index, normalizing each
//! source's scores, and blending four relevance signals per document into
//! one ranked list that carries its own score breakdown.
//!
//! ## Design
//!
//! - Lexical and vector retrieval run concurrently, each time-bounded
//! - Graceful degradation: if the embedding model or KNN call fails, the
//!   lexical results are still ranked and returned
//! - A failure of both sources is reported as
//!   [`SearchError::BackendUnavailable`], never as an empty result list
//! - Query embeddings are memoized in an injected, bounded LRU
//!   [`EmbeddingCache`]
//! - Blend weights live in [`FusionWeights`], loaded from configuration
//!
//! ## Security
//!
//! - Query text is logged only at trace level
//! - API keys are never written to logs or `Debug` output

pub mod backend;
pub mod backends;
pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod orchestrator;
pub mod tokenizer;
pub mod types;

pub use backend::{EmbeddingProvider, RetrievalBackend};
pub use cache::{CacheStats, EmbeddingCache};
pub use config::{FusionWeights, SearchConfig};
pub use error::{Result, SearchError};
pub use orchestrator::search::{FusionEngine, MAX_K, MIN_K};
pub use types::{RankedResult, RetrievalHit, RetrievalSource, ScoreBreakdown};

/// Engine wired to an OpenSearch index and an HTTP embeddings endpoint.
pub type OpenSearchFusionEngine =
    FusionEngine<backends::OpenSearchBackend, backends::HttpEmbeddingProvider>;

/// Build an [`OpenSearchFusionEngine`] from adapter settings.
///
/// Both adapters use `config.timeout_seconds` as their HTTP timeout.
///
/// # Errors
///
/// Returns [`SearchError::Config`] if any of the settings are invalid.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> hybrid_search::Result<()> {
/// use hybrid_search::backends::{HttpEmbeddingConfig, OpenSearchConfig};
///
/// let engine = hybrid_search::connect(
///     OpenSearchConfig::default(),
///     HttpEmbeddingConfig::default(),
///     hybrid_search::SearchConfig::default(),
///     1000,
/// )?;
/// for result in engine.search("black leather jacket", 5).await? {
///     println!("{:.4} {}", result.final_score, result.title);
/// }
/// # Ok(())
/// # }
/// ```
pub fn connect(
    opensearch: backends::OpenSearchConfig,
    embedding: backends::HttpEmbeddingConfig,
    config: SearchConfig,
    cache_capacity: u64,
) -> Result<OpenSearchFusionEngine> {
    config.validate()?;
    if cache_capacity == 0 {
        return Err(SearchError::Config(
            "cache capacity must be greater than 0".into(),
        ));
    }
    let backend = backends::OpenSearchBackend::new(opensearch, config.timeout_seconds)?;
    let provider = backends::HttpEmbeddingProvider::new(embedding, config.timeout_seconds)?;
    FusionEngine::new(backend, EmbeddingCache::new(provider, cache_capacity), config)
}
