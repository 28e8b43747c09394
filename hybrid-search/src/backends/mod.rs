//! Concrete collaborators for the fusion engine.
//!
//! [`OpenSearchBackend`] implements [`crate::backend::RetrievalBackend`]
//! over an OpenSearch index, and [`HttpEmbeddingProvider`] implements
//! [`crate::backend::EmbeddingProvider`] over an embeddings endpoint.

pub mod embedding_http;
pub mod opensearch;

pub use embedding_http::{HttpEmbeddingConfig, HttpEmbeddingProvider};
pub use opensearch::{OpenSearchBackend, OpenSearchConfig};
