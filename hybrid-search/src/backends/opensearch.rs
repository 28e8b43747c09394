//! OpenSearch retrieval backend.
//!
//! Issues lexical and KNN queries against one index's `_search` endpoint
//! and converts `hits.hits[]` into [`RetrievalHit`] values. Entries without
//! a non-blank `_id` are skipped; a missing `_score` counts as `0.0` and a missing
//! title as an empty string.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use url::Url;

use crate::backend::RetrievalBackend;
use crate::error::SearchError;
use crate::http::{build_client, parse_endpoint, transport_error};
use crate::types::{is_valid_document_id, RetrievalHit};

/// Longest response body excerpt kept in an error message.
const ERROR_BODY_LIMIT: usize = 200;

/// Connection and mapping settings for an OpenSearch index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenSearchConfig {
    /// Cluster base URL.
    pub url: String,
    /// Index holding the product documents.
    pub index: String,
    /// Text field matched lexically and returned as the title.
    pub title_field: String,
    /// `knn_vector` field searched by the vector query.
    pub vector_field: String,
}

impl Default for OpenSearchConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:9200".into(),
            index: "products".into(),
            title_field: "title".into(),
            vector_field: "embedding".into(),
        }
    }
}

/// [`RetrievalBackend`] over the OpenSearch REST API.
#[derive(Debug, Clone)]
pub struct OpenSearchBackend {
    client: reqwest::Client,
    search_url: Url,
    config: OpenSearchConfig,
}

impl OpenSearchBackend {
    /// Create a backend whose HTTP requests time out after `timeout_seconds`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] for an invalid URL, an empty or
    /// path-like index name, or empty field names.
    pub fn new(config: OpenSearchConfig, timeout_seconds: u64) -> Result<Self, SearchError> {
        if config.index.trim().is_empty() || config.index.contains('/') {
            return Err(SearchError::Config(format!(
                "invalid OpenSearch index name '{}'",
                config.index
            )));
        }
        if config.title_field.trim().is_empty() || config.vector_field.trim().is_empty() {
            return Err(SearchError::Config(
                "OpenSearch title_field and vector_field must not be empty".into(),
            ));
        }
        let search_url = search_url(&config.url, &config.index)?;
        let client = build_client(timeout_seconds)?;
        Ok(Self {
            client,
            search_url,
            config,
        })
    }

    /// The fully resolved `<url>/<index>/_search` endpoint.
    pub fn search_url(&self) -> &Url {
        &self.search_url
    }

    /// Request body for the lexical query: term, boosted phrase and fuzzy
    /// matches on the title, OR-combined with at least one required.
    pub fn lexical_request(&self, query: &str, limit: usize) -> Value {
        let field = self.config.title_field.as_str();
        json!({
            "size": limit,
            "_source": [field],
            "query": {
                "bool": {
                    "should": [
                        { "match": { field: { "query": query, "boost": 1.0 } } },
                        { "match_phrase": { field: { "query": query, "boost": 2.0 } } },
                        { "match": { field: { "query": query, "fuzziness": "AUTO", "boost": 0.4 } } }
                    ],
                    "minimum_should_match": 1
                }
            }
        })
    }

    /// Request body for the KNN query.
    pub fn vector_request(&self, vector: &[f32], limit: usize) -> Value {
        let mut knn = Map::new();
        knn.insert(
            self.config.vector_field.clone(),
            json!({ "vector": vector, "k": limit }),
        );
        json!({
            "size": limit,
            "_source": [self.config.title_field.as_str()],
            "query": { "knn": knn }
        })
    }

    async fn execute(&self, body: &Value, context: &str) -> Result<Vec<RetrievalHit>, SearchError> {
        let response = self
            .client
            .post(self.search_url.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error(context, &e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| transport_error(context, &e))?;

        if !status.is_success() {
            return Err(SearchError::Backend(format!(
                "{context} returned status {}: {}",
                status.as_u16(),
                excerpt(&text)
            )));
        }

        let value: Value = serde_json::from_str(&text)
            .map_err(|e| SearchError::Backend(format!("{context} returned invalid JSON: {e}")))?;
        parse_hits(value, &self.config.title_field)
    }
}

impl RetrievalBackend for OpenSearchBackend {
    async fn lexical_search(&self, query: &str, limit: usize) -> Result<Vec<RetrievalHit>, SearchError> {
        let body = self.lexical_request(query, limit);
        self.execute(&body, "lexical search").await
    }

    async fn vector_search(&self, vector: &[f32], limit: usize) -> Result<Vec<RetrievalHit>, SearchError> {
        let body = self.vector_request(vector, limit);
        self.execute(&body, "vector search").await
    }
}

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: HitsEnvelope,
}

#[derive(Debug, Default, Deserialize)]
struct HitsEnvelope {
    #[serde(default)]
    hits: Vec<RawHit>,
}

#[derive(Debug, Deserialize)]
struct RawHit {
    #[serde(rename = "_id")]
    id: Option<String>,
    #[serde(rename = "_score")]
    score: Option<f64>,
    #[serde(rename = "_source")]
    source: Option<Map<String, Value>>,
}

/// Convert an OpenSearch `_search` response body into hits, in rank order.
///
/// # Errors
///
/// Returns [`SearchError::Backend`] if the body does not have the
/// `hits.hits[]` shape.
pub fn parse_hits(body: Value, title_field: &str) -> Result<Vec<RetrievalHit>, SearchError> {
    let response: SearchResponse = serde_json::from_value(body)
        .map_err(|e| SearchError::Backend(format!("unexpected search response shape: {e}")))?;

    let total = response.hits.hits.len();
    let hits: Vec<RetrievalHit> = response
        .hits
        .hits
        .into_iter()
        .filter_map(|raw| {
            let document_id = raw.id.filter(|id| is_valid_document_id(id))?;
            let title = raw
                .source
                .as_ref()
                .and_then(|source| source.get(title_field))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned();
            Some(RetrievalHit {
                document_id,
                raw_score: raw.score.unwrap_or(0.0),
                title,
            })
        })
        .collect();

    if hits.len() < total {
        tracing::debug!(skipped = total - hits.len(), "dropped hits without _id");
    }
    Ok(hits)
}

fn search_url(base: &str, index: &str) -> Result<Url, SearchError> {
    let mut url = parse_endpoint(base)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.join(&format!("{index}/_search"))
        .map_err(|e| SearchError::Config(format!("invalid OpenSearch index '{index}': {e}")))
}

fn excerpt(body: &str) -> String {
    body.chars().take(ERROR_BODY_LIMIT).collect()
}
