//! Core types for retrieval hits, score breakdowns and ranked results.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Which retrieval path produced a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalSource {
    /// Keyword matching (BM25-style) over the title field.
    Lexical,
    /// Approximate nearest-neighbour search over the embedding field.
    Vector,
}

impl RetrievalSource {
    /// Returns the lowercase name of this source.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Lexical => "lexical",
            Self::Vector => "vector",
        }
    }
}

impl fmt::Display for RetrievalSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single document returned by one retrieval call.
///
/// `raw_score` is source-specific and only comparable with other scores
/// from the same call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalHit {
    /// Opaque identifier, stable within one index generation.
    pub document_id: String,
    /// Backend relevance score.
    pub raw_score: f64,
    /// Document title used for token and phrase signals.
    pub title: String,
}

impl RetrievalHit {
    /// Convenience constructor.
    pub fn new(document_id: impl Into<String>, raw_score: f64, title: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            raw_score,
            title: title.into(),
        }
    }

    /// Returns `true` if this hit carries a usable document id.
    pub fn has_valid_id(&self) -> bool {
        is_valid_document_id(&self.document_id)
    }
}

/// A document id is usable when it is not empty or whitespace-only.
/// Hits failing this check are malformed and discarded.
pub fn is_valid_document_id(id: &str) -> bool {
    !id.trim().is_empty()
}

/// Weighted contribution of each relevance signal to a final score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub semantic: f64,
    pub lexical: f64,
    pub phrase: f64,
    pub fuzzy: f64,
}

impl ScoreBreakdown {
    /// Sum of all four components.
    pub fn total(&self) -> f64 {
        self.semantic + self.lexical + self.phrase + self.fuzzy
    }

    /// Copy with every component rounded to 4 decimal digits, for display.
    pub fn rounded(&self) -> Self {
        Self {
            semantic: round4(self.semantic),
            lexical: round4(self.lexical),
            phrase: round4(self.phrase),
            fuzzy: round4(self.fuzzy),
        }
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// One entry of the fused ranking.
///
/// `final_score` and `explain` keep full precision in memory; `explain` is
/// rounded to 4 decimals when serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    pub document_id: String,
    pub title: String,
    pub final_score: f64,
    #[serde(serialize_with = "serialize_rounded")]
    pub explain: ScoreBreakdown,
    /// Retrieval paths that returned this document, in merge order.
    pub sources: Vec<RetrievalSource>,
}

fn serialize_rounded<S: Serializer>(breakdown: &ScoreBreakdown, serializer: S) -> Result<S::Ok, S::Error> {
    breakdown.rounded().serialize(serializer)
}
