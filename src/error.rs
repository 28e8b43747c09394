//! Error types for the product-search application.

use hybrid_search::SearchError;

/// Top-level error type for the application layer.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Retrieval or fusion failure from the search engine.
    #[error(transparent)]
    Search(#[from] SearchError),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Whether the error was caused by the caller's input rather than by
    /// the environment.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::Search(SearchError::InvalidArgument(_)))
    }
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, AppError>;
