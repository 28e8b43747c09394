//! Application configuration loaded from TOML.
//!
//! ```toml
//! [opensearch]
//! url = "http://localhost:9200"
//! index = "products"
//!
//! [embedding]
//! endpoint = "http://localhost:8080/v1/embeddings"
//! model = "all-MiniLM-L6-v2"
//!
//! [search]
//! timeout_seconds = 10
//!
//! [search.weights]
//! vector = 0.55
//! keyword = 0.30
//! phrase = 0.10
//! fuzzy = 0.05
//!
//! [cache]
//! capacity = 1000
//! ```
//!
//! Every section is optional; missing keys take their defaults.

use std::path::{Path, PathBuf};

use hybrid_search::backends::{HttpEmbeddingConfig, OpenSearchConfig};
use hybrid_search::{OpenSearchFusionEngine, SearchConfig};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Environment variable overriding the config directory.
pub const CONFIG_DIR_ENV: &str = "PRODUCT_SEARCH_CONFIG_DIR";

/// Embedding cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of query embeddings kept in memory.
    pub capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: hybrid_search::cache::DEFAULT_CAPACITY,
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// OpenSearch connection and index mapping.
    pub opensearch: OpenSearchConfig,
    /// Embedding model endpoint.
    pub embedding: HttpEmbeddingConfig,
    /// Timeouts, candidate limits and blend weights.
    pub search: SearchConfig,
    /// Query embedding cache.
    pub cache: CacheConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| AppError::Config(format!("{}: {e}", path.display())))
    }

    /// Load `path` if given, otherwise the default path if it exists,
    /// otherwise the built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default = Self::default_config_path();
                if default.is_file() {
                    tracing::debug!(path = %default.display(), "loading default config");
                    Self::from_file(&default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Serialize as pretty TOML.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] if serialization fails.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| AppError::Config(e.to_string()))
    }

    /// Returns the default config file path:
    /// `<config dir>/product-search/config.toml`.
    ///
    /// The directory can be overridden with `PRODUCT_SEARCH_CONFIG_DIR`.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        let dir = std::env::var_os(CONFIG_DIR_ENV)
            .map(PathBuf::from)
            .or_else(|| dirs::config_dir().map(|d| d.join("product-search")))
            .unwrap_or_else(|| PathBuf::from("/tmp/product-search-config"));
        dir.join("config.toml")
    }

    /// Check every section without touching the network.
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting found.
    pub fn validate(&self) -> Result<()> {
        self.search.validate()?;
        if self.cache.capacity == 0 {
            return Err(AppError::Config("cache.capacity must be greater than 0".into()));
        }
        Ok(())
    }

    /// Build the fusion engine described by this configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any section is invalid.
    pub fn connect(&self) -> Result<OpenSearchFusionEngine> {
        self.validate()?;
        let engine = hybrid_search::connect(
            self.opensearch.clone(),
            self.embedding.clone(),
            self.search.clone(),
            self.cache.capacity,
        )?;
        Ok(engine)
    }
}
