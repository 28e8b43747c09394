//! Error types for the hybrid-search crate.
//!
//! All errors use stable string messages suitable for display to users
//! and programmatic handling. Query text never appears in error messages.

/// Errors that can occur during a fused search.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The caller supplied an empty query or an out-of-range `k`.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A retrieval call exceeded its time bound.
    #[error("backend timed out: {0}")]
    BackendTimeout(String),

    /// A retrieval call failed (transport error, error status, bad body).
    #[error("backend error: {0}")]
    Backend(String),

    /// The embedding provider failed, timed out, or returned malformed output.
    #[error("embedding model unavailable: {0}")]
    ModelUnavailable(String),

    /// Neither lexical nor vector retrieval produced any hits.
    #[error("search backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Invalid search configuration.
    #[error("config error: {0}")]
    Config(String),
}

impl SearchError {
    /// Returns `true` for failures that the engine absorbs by treating one
    /// retrieval source as empty.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::BackendTimeout(_) | Self::Backend(_) | Self::ModelUnavailable(_)
        )
    }
}

/// Convenience type alias for hybrid-search results.
pub type Result<T> = std::result::Result<T, SearchError>;
