//! Shared HTTP client for the OpenSearch and embedding adapters.

use std::time::Duration;

use url::Url;

use crate::error::SearchError;

/// User-Agent sent with every request.
pub const USER_AGENT: &str = concat!("hybrid-search/", env!("CARGO_PKG_VERSION"));

/// Build a [`reqwest::Client`] whose request timeout matches the engine's
/// per-call bound.
///
/// # Errors
///
/// Returns [`SearchError::Config`] if the client cannot be constructed.
pub fn build_client(timeout_seconds: u64) -> Result<reqwest::Client, SearchError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| SearchError::Config(format!("failed to build HTTP client: {e}")))
}

/// Parse an endpoint URL from configuration.
///
/// # Errors
///
/// Returns [`SearchError::Config`] for anything that is not an absolute
/// `http`/`https` URL.
pub fn parse_endpoint(raw: &str) -> Result<Url, SearchError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| SearchError::Config(format!("invalid URL '{raw}': {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(SearchError::Config(format!(
            "unsupported URL scheme '{other}' in '{raw}'"
        ))),
    }
}

/// Map a transport-level failure, keeping timeouts distinguishable.
pub fn transport_error(context: &str, err: &reqwest::Error) -> SearchError {
    if err.is_timeout() {
        SearchError::BackendTimeout(format!("{context}: {err}"))
    } else {
        SearchError::Backend(format!("{context}: {err}"))
    }
}
