//! Product search application: configuration, wiring and output on top of
//! the `hybrid-search` fusion engine.

pub mod config;
pub mod error;
pub mod output;

pub use config::{AppConfig, CacheConfig};
pub use error::{AppError, Result};

use hybrid_search::RankedResult;

/// Load configuration, build the engine and run one query.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the search fails.
pub async fn run_search(config: &AppConfig, query: &str, k: usize) -> Result<Vec<RankedResult>> {
    let engine = config.connect()?;
    let results = engine.search(query, k).await?;
    tracing::info!(results = results.len(), "search complete");
    Ok(results)
}
