//! Search configuration with sensible defaults.
//!
//! [`SearchConfig`] controls per-call timeouts, how many candidates each
//! retrieval source contributes, and the [`FusionWeights`] used to blend
//! relevance signals. Both types deserialize from TOML with every field
//! optional.

use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// Blend weights for the four relevance signals.
///
/// Weights are a relative ranking signal, not a probability; they do not
/// need to sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionWeights {
    /// Weight applied to the normalized KNN score.
    pub vector: f64,
    /// Weight applied to the lexical blend (normalized BM25 + token overlap).
    pub keyword: f64,
    /// Bonus for an exact query substring in the title.
    pub phrase: f64,
    /// Weight applied to token-set Jaccard similarity.
    pub fuzzy: f64,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            vector: 0.55,
            keyword: 0.30,
            phrase: 0.10,
            fuzzy: 0.05,
        }
    }
}

impl FusionWeights {
    /// Validates that every weight is finite and non-negative.
    pub fn validate(&self) -> Result<(), SearchError> {
        let named = [
            ("vector", self.vector),
            ("keyword", self.keyword),
            ("phrase", self.phrase),
            ("fuzzy", self.fuzzy),
        ];
        for (name, weight) in named {
            if !weight.is_finite() || weight < 0.0 {
                return Err(SearchError::Config(format!(
                    "weights.{name} must be a finite, non-negative number"
                )));
            }
        }
        Ok(())
    }
}

/// Configuration for the fusion engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Per-call time bound in seconds, applied to the lexical call, the
    /// embedding lookup and the KNN call independently.
    pub timeout_seconds: u64,
    /// Result limit sent with the lexical retrieval call.
    pub lexical_candidates: usize,
    /// Result limit (and `k`) sent with the KNN retrieval call.
    pub vector_candidates: usize,
    /// Signal blend weights.
    pub weights: FusionWeights,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 10,
            lexical_candidates: 50,
            vector_candidates: 50,
            weights: FusionWeights::default(),
        }
    }
}

impl SearchConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `timeout_seconds` must be greater than 0
    /// - `lexical_candidates` and `vector_candidates` must be greater than 0
    /// - every weight must be finite and non-negative
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.timeout_seconds == 0 {
            return Err(SearchError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.lexical_candidates == 0 {
            return Err(SearchError::Config(
                "lexical_candidates must be greater than 0".into(),
            ));
        }
        if self.vector_candidates == 0 {
            return Err(SearchError::Config(
                "vector_candidates must be greater than 0".into(),
            ));
        }
        self.weights.validate()
    }
}
