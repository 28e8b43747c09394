//! Core fusion engine: validate, retrieve from both sources, merge, score,
//! rank.
//!
//! Lexical and vector retrieval run concurrently, each under its own time
//! bound. A failing source is logged and treated as empty; only when both
//! sources come back empty does the request fail, with
//! [`SearchError::BackendUnavailable`].

use std::time::Duration;

use crate::backend::{EmbeddingProvider, RetrievalBackend};
use crate::cache::EmbeddingCache;
use crate::config::{FusionWeights, SearchConfig};
use crate::error::SearchError;
use crate::types::{RankedResult, RetrievalHit, RetrievalSource};

use super::merge::merge_candidates;
use super::normalize::{knn_scores, lexical_scores};
use super::scoring::{score_candidate, QueryProfile, SourceScores};

/// Smallest accepted `k`.
pub const MIN_K: usize = 1;
/// Largest accepted `k`.
pub const MAX_K: usize = 50;

/// Hybrid retrieval engine over one backend and one cached embedding model.
pub struct FusionEngine<B, P> {
    backend: B,
    embeddings: EmbeddingCache<P>,
    config: SearchConfig,
}

impl<B, P> FusionEngine<B, P>
where
    B: RetrievalBackend,
    P: EmbeddingProvider,
{
    /// Build an engine from its collaborators.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if `config` fails validation.
    pub fn new(
        backend: B,
        embeddings: EmbeddingCache<P>,
        config: SearchConfig,
    ) -> Result<Self, SearchError> {
        config.validate()?;
        Ok(Self {
            backend,
            embeddings,
            config,
        })
    }

    /// Run a fused search and return at most `k` ranked results.
    ///
    /// # Pipeline
    ///
    /// 1. Reject an empty query or `k` outside `[1, 50]` before any call
    /// 2. Run lexical retrieval and embedding + KNN retrieval concurrently
    /// 3. Log per-source failures at warn level; failed sources count as empty,
    ///    and hits without a valid document id are discarded
    /// 4. Merge candidates (vector hits first), score, stable-sort, truncate
    ///
    /// # Errors
    ///
    /// - [`SearchError::InvalidArgument`] for a blank query or bad `k`
    /// - [`SearchError::BackendUnavailable`] if neither source returned a
    ///   well-formed hit
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<RankedResult>, SearchError> {
        let trimmed = validate_request(query, k)?;
        tracing::trace!(query = trimmed, k, "fused search");

        // The embedding cache is keyed by the exact text the caller sent.
        let (lexical, vector) =
            futures::future::join(self.retrieve_lexical(trimmed), self.retrieve_vector(query)).await;

        let mut failures: Vec<String> = Vec::new();
        let lexical_hits = collect_hits(RetrievalSource::Lexical, lexical, &mut failures);
        let vector_hits = collect_hits(RetrievalSource::Vector, vector, &mut failures);

        if lexical_hits.is_empty() && vector_hits.is_empty() {
            let detail = if failures.is_empty() {
                "no hits from lexical or vector retrieval".to_string()
            } else {
                failures.join("; ")
            };
            return Err(SearchError::BackendUnavailable(detail));
        }

        let results = rank_candidates(trimmed, &lexical_hits, &vector_hits, &self.config.weights, k);
        tracing::debug!(
            lexical = lexical_hits.len(),
            vector = vector_hits.len(),
            returned = results.len(),
            "fused search complete"
        );
        Ok(results)
    }

    /// The engine's retrieval backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The engine's embedding cache.
    pub fn embeddings(&self) -> &EmbeddingCache<P> {
        &self.embeddings
    }

    /// The engine's configuration.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.config.timeout_seconds)
    }

    async fn retrieve_lexical(&self, query: &str) -> Result<Vec<RetrievalHit>, SearchError> {
        let limit = self.config.lexical_candidates;
        tokio::time::timeout(self.call_timeout(), self.backend.lexical_search(query, limit))
            .await
            .map_err(|_| {
                SearchError::BackendTimeout(format!(
                    "lexical search exceeded {}s",
                    self.config.timeout_seconds
                ))
            })?
    }

    async fn retrieve_vector(&self, query: &str) -> Result<Vec<RetrievalHit>, SearchError> {
        let vector = tokio::time::timeout(self.call_timeout(), self.embeddings.embed(query))
            .await
            .map_err(|_| {
                SearchError::ModelUnavailable(format!(
                    "embedding exceeded {}s",
                    self.config.timeout_seconds
                ))
            })??;

        let limit = self.config.vector_candidates;
        tokio::time::timeout(self.call_timeout(), self.backend.vector_search(&vector, limit))
            .await
            .map_err(|_| {
                SearchError::BackendTimeout(format!(
                    "vector search exceeded {}s",
                    self.config.timeout_seconds
                ))
            })?
    }
}

/// Check `query` and `k`, returning the trimmed query.
///
/// # Errors
///
/// Returns [`SearchError::InvalidArgument`] for a blank query or `k`
/// outside `[MIN_K, MAX_K]`.
pub fn validate_request(query: &str, k: usize) -> Result<&str, SearchError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(SearchError::InvalidArgument("query cannot be empty".into()));
    }
    if !(MIN_K..=MAX_K).contains(&k) {
        return Err(SearchError::InvalidArgument(format!(
            "k must be between {MIN_K} and {MAX_K}"
        )));
    }
    Ok(trimmed)
}

/// Merge, score, sort and truncate two hit lists for `query`.
///
/// Equal final scores keep merge insertion order (vector hits first, then
/// lexical hits, each in backend order).
pub fn rank_candidates(
    query: &str,
    lexical: &[RetrievalHit],
    vector: &[RetrievalHit],
    weights: &FusionWeights,
    k: usize,
) -> Vec<RankedResult> {
    let profile = QueryProfile::new(query);
    let lexical_norm = lexical_scores(lexical);
    let vector_norm = knn_scores(vector);

    let mut results: Vec<RankedResult> = merge_candidates(lexical, vector)
        .into_iter()
        .map(|candidate| {
            let id = candidate.document_id();
            let scores = SourceScores {
                vector: vector_norm.get(id).copied().unwrap_or(0.0),
                lexical: lexical_norm.get(id).copied().unwrap_or(0.0),
            };
            let explain = score_candidate(&profile, candidate.title(), scores, weights);
            RankedResult {
                final_score: explain.total(),
                explain,
                sources: candidate.sources,
                document_id: candidate.hit.document_id,
                title: candidate.hit.title,
            }
        })
        .collect();

    results.sort_by(|a, b| {
        b.final_score
            .partial_cmp(&a.final_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    results.truncate(k);
    results
}

fn collect_hits(
    source: RetrievalSource,
    outcome: Result<Vec<RetrievalHit>, SearchError>,
    failures: &mut Vec<String>,
) -> Vec<RetrievalHit> {
    match outcome {
        Ok(mut hits) => {
            let returned = hits.len();
            hits.retain(RetrievalHit::has_valid_id);
            if hits.len() < returned {
                tracing::debug!(%source, skipped = returned - hits.len(), "discarded hits without document id");
            }
            tracing::debug!(%source, count = hits.len(), "source returned hits");
            hits
        }
        Err(err) => {
            tracing::warn!(%source, error = %err, "retrieval degraded, continuing without source");
            failures.push(format!("{source}: {err}"));
            Vec::new()
        }
    }
}
