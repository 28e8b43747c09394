//! Embedding provider over an OpenAI-compatible `/embeddings` endpoint.
//!
//! Sends `{"model": ..., "input": text}` and reads `data[0].embedding`.
//! Every failure, including an error status or an unexpected body, maps
//! to [`SearchError::ModelUnavailable`] so the engine can fall back to
//! lexical-only ranking.

use serde::{Deserialize, Serialize};
use serde_json::json;
use url::Url;

use crate::backend::EmbeddingProvider;
use crate::error::SearchError;
use crate::http::{build_client, parse_endpoint};

/// Settings for the HTTP embedding provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpEmbeddingConfig {
    /// Full URL of the embeddings endpoint.
    pub endpoint: String,
    /// Model name sent with every request.
    pub model: String,
    /// Expected vector length; `None` skips the check.
    pub dimension: Option<usize>,
    /// Environment variable holding a bearer token, if the endpoint needs one.
    pub api_key_env: Option<String>,
}

impl Default for HttpEmbeddingConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8080/v1/embeddings".into(),
            model: "all-MiniLM-L6-v2".into(),
            dimension: Some(384),
            api_key_env: None,
        }
    }
}

/// [`EmbeddingProvider`] backed by an HTTP embeddings service.
#[derive(Clone)]
pub struct HttpEmbeddingProvider {
    client: reqwest::Client,
    endpoint: Url,
    model: String,
    dimension: Option<usize>,
    api_key: Option<String>,
}

impl std::fmt::Debug for HttpEmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpEmbeddingProvider")
            .field("endpoint", &self.endpoint.as_str())
            .field("model", &self.model)
            .field("dimension", &self.dimension)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl HttpEmbeddingProvider {
    /// Create a provider whose requests time out after `timeout_seconds`.
    ///
    /// The API key is read from `config.api_key_env` once, here. A missing
    /// variable is logged and requests are sent without a token.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] for an invalid endpoint, an empty
    /// model name, or a zero dimension.
    pub fn new(config: HttpEmbeddingConfig, timeout_seconds: u64) -> Result<Self, SearchError> {
        let endpoint = parse_endpoint(&config.endpoint)?;
        if config.model.trim().is_empty() {
            return Err(SearchError::Config("embedding model must not be empty".into()));
        }
        if config.dimension == Some(0) {
            return Err(SearchError::Config(
                "embedding dimension must be greater than 0".into(),
            ));
        }
        let api_key = config.api_key_env.as_deref().and_then(|var| {
            let value = std::env::var(var).ok().filter(|v| !v.trim().is_empty());
            if value.is_none() {
                tracing::warn!(env = var, "embedding API key variable is not set");
            }
            value
        });

        Ok(Self {
            client: build_client(timeout_seconds)?,
            endpoint,
            model: config.model,
            dimension: config.dimension,
            api_key,
        })
    }

    /// Attach a bearer token directly instead of reading it from the
    /// environment.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// The model name sent with each request.
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingDatum {
    embedding: Vec<f32>,
}

impl EmbeddingProvider for HttpEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, SearchError> {
        let mut request = self
            .client
            .post(self.endpoint.clone())
            .json(&json!({ "model": self.model, "input": text }));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SearchError::ModelUnavailable(format!("embedding request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::ModelUnavailable(format!(
                "embedding endpoint returned status {}",
                status.as_u16()
            )));
        }

        let body: EmbeddingResponse = response.json().await.map_err(|e| {
            SearchError::ModelUnavailable(format!("malformed embedding response: {e}"))
        })?;

        body.data
            .into_iter()
            .next()
            .map(|datum| datum.embedding)
            .ok_or_else(|| SearchError::ModelUnavailable("embedding response had no data".into()))
    }

    fn dimension(&self) -> Option<usize> {
        self.dimension
    }
}
