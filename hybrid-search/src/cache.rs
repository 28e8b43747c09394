//! Bounded LRU memoization of query embeddings.
//!
//! [`EmbeddingCache`] owns an [`EmbeddingProvider`] and a [`moka`] cache
//! keyed by the exact query string (case-sensitive, untrimmed). A hit never
//! reaches the provider; a miss calls it and stores the vector before
//! returning. Failed or malformed lookups are never cached, so the next
//! call retries.
//!
//! The cache is an ordinary owned value passed into the engine. Two racing
//! misses for the same text may both call the provider; the provider is
//! deterministic so either result is fine.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use moka::future::Cache;
use moka::policy::EvictionPolicy;

use crate::backend::EmbeddingProvider;
use crate::error::SearchError;

/// Default number of cached query embeddings.
pub const DEFAULT_CAPACITY: u64 = 1000;

/// Hit/miss counters since construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Memoizing wrapper around an embedding provider.
pub struct EmbeddingCache<P> {
    provider: P,
    entries: Cache<String, Arc<[f32]>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<P: EmbeddingProvider> EmbeddingCache<P> {
    /// Wrap `provider` with an LRU table holding at most `capacity` vectors.
    pub fn new(provider: P, capacity: u64) -> Self {
        let entries = Cache::builder()
            .max_capacity(capacity)
            .eviction_policy(EvictionPolicy::lru())
            .build();
        Self {
            provider,
            entries,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Wrap `provider` with [`DEFAULT_CAPACITY`].
    pub fn with_default_capacity(provider: P) -> Self {
        Self::new(provider, DEFAULT_CAPACITY)
    }

    /// Return the embedding for `text`, calling the provider on a miss.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::ModelUnavailable`] if the provider fails or
    /// returns an empty, non-finite or wrongly sized vector.
    pub async fn embed(&self, text: &str) -> Result<Arc<[f32]>, SearchError> {
        if let Some(vector) = self.entries.get(text).await {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(dimension = vector.len(), "embedding cache hit");
            return Ok(vector);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let raw = self.provider.embed(text).await.map_err(into_model_error)?;
        check_vector(&raw, self.provider.dimension())?;

        let vector: Arc<[f32]> = raw.into();
        self.entries.insert(text.to_owned(), Arc::clone(&vector)).await;
        tracing::debug!(dimension = vector.len(), "embedding cache miss stored");
        Ok(vector)
    }

    /// Hit/miss counters since construction.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    /// Approximate number of cached vectors. Call
    /// [`EmbeddingCache::run_pending_tasks`] first for an exact figure.
    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }

    /// Flush moka's pending eviction and bookkeeping work.
    pub async fn run_pending_tasks(&self) {
        self.entries.run_pending_tasks().await;
    }

    /// Returns `true` if `text` currently has a cached vector.
    pub fn contains(&self, text: &str) -> bool {
        self.entries.contains_key(text)
    }

    /// The wrapped provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }
}

/// Provider errors of any kind surface as a model failure.
fn into_model_error(err: SearchError) -> SearchError {
    match err {
        SearchError::ModelUnavailable(_) => err,
        other => SearchError::ModelUnavailable(other.to_string()),
    }
}

fn check_vector(vector: &[f32], expected: Option<usize>) -> Result<(), SearchError> {
    if vector.is_empty() {
        return Err(SearchError::ModelUnavailable(
            "provider returned an empty vector".into(),
        ));
    }
    if let Some(dimension) = expected {
        if vector.len() != dimension {
            return Err(SearchError::ModelUnavailable(format!(
                "expected {dimension} dimensions, got {}",
                vector.len()
            )));
        }
    }
    if vector.iter().any(|v| !v.is_finite()) {
        return Err(SearchError::ModelUnavailable(
            "provider returned non-finite values".into(),
        ));
    }
    Ok(())
}
