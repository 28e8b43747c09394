//! Trait definitions for the pluggable retrieval backend and embedding
//! provider.
//!
//! The engine is generic over both traits so tests can substitute
//! in-memory implementations for the OpenSearch and HTTP adapters in
//! [`crate::backends`].

use crate::error::SearchError;
use crate::types::RetrievalHit;

/// A search backend able to run both lexical and KNN queries against one
/// populated index.
///
/// Hits are returned in backend rank order. Implementations must skip
/// malformed entries (no document id) rather than failing the call.
///
/// All implementations must be `Send + Sync` so both calls can run
/// concurrently.
pub trait RetrievalBackend: Send + Sync {
    /// Keyword search over the title field.
    ///
    /// Combines a plain term match, a boosted phrase match and a fuzzy term
    /// match with OR semantics, requiring at least one to match.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Backend`] or [`SearchError::BackendTimeout`]
    /// if the call cannot be completed.
    fn lexical_search(
        &self,
        query: &str,
        limit: usize,
    ) -> impl std::future::Future<Output = Result<Vec<RetrievalHit>, SearchError>> + Send;

    /// Approximate nearest-neighbour search over the embedding field.
    ///
    /// # Errors
    ///
    /// Same as [`RetrievalBackend::lexical_search`].
    fn vector_search(
        &self,
        vector: &[f32],
        limit: usize,
    ) -> impl std::future::Future<Output = Result<Vec<RetrievalHit>, SearchError>> + Send;
}

/// A text embedding model.
///
/// Must be deterministic for identical input and model version.
pub trait EmbeddingProvider: Send + Sync {
    /// Embed `text` into a fixed-dimension vector.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::ModelUnavailable`] if the model cannot be
    /// reached or returns unusable output.
    fn embed(
        &self,
        text: &str,
    ) -> impl std::future::Future<Output = Result<Vec<f32>, SearchError>> + Send;

    /// Expected output dimension, if known. Used to reject malformed vectors.
    fn dimension(&self) -> Option<usize> {
        None
    }
}
