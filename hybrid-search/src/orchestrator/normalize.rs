//! Per-source score normalization.
//!
//! Lexical and KNN scores live on unrelated scales, so each source gets its
//! own rule:
//!
//! ```text
//! lexical(d) = raw(d) / max(raw)          (0 for every d when max <= 0)
//! knn(s)     = s / (1 + max(s, 0))
//! ```
//!
//! The lexical rule needs the whole hit set for one query; the KNN rule is
//! pointwise because KNN scores are not comparable across queries the way a
//! per-query BM25 maximum is.

use std::collections::HashMap;

use crate::types::RetrievalHit;

/// Scale lexical scores into `[0, 1]` by the largest score in the set.
///
/// The top document maps to exactly `1.0` when the maximum is positive.
/// Non-finite scores count as `0.0`.
pub fn normalize_lexical_scores(raw: &HashMap<String, f64>) -> HashMap<String, f64> {
    let max = raw
        .values()
        .copied()
        .map(finite_or_zero)
        .fold(f64::NEG_INFINITY, f64::max);

    raw.iter()
        .map(|(id, &score)| {
            let normalized = if max > 0.0 {
                (finite_or_zero(score) / max).max(0.0)
            } else {
                0.0
            };
            (id.clone(), normalized)
        })
        .collect()
}

/// Saturating map of a KNN score: positive scores approach 1, non-positive
/// scores pass through unchanged. Non-finite scores map to `0.0`.
pub fn normalize_knn_score(score: f64) -> f64 {
    let score = finite_or_zero(score);
    score / (1.0 + score.max(0.0))
}

/// Raw score per document id, keeping the first occurrence of a repeated id.
/// Hits without a valid id are ignored.
pub fn raw_scores(hits: &[RetrievalHit]) -> HashMap<String, f64> {
    let mut scores = HashMap::with_capacity(hits.len());
    for hit in hits.iter().filter(|hit| hit.has_valid_id()) {
        scores
            .entry(hit.document_id.clone())
            .or_insert(hit.raw_score);
    }
    scores
}

/// Normalized lexical score per document id for one query's hit set.
pub fn lexical_scores(hits: &[RetrievalHit]) -> HashMap<String, f64> {
    normalize_lexical_scores(&raw_scores(hits))
}

/// Normalized KNN score per document id for one query's hit set.
pub fn knn_scores(hits: &[RetrievalHit]) -> HashMap<String, f64> {
    raw_scores(hits)
        .into_iter()
        .map(|(id, score)| (id, normalize_knn_score(score)))
        .collect()
}

fn finite_or_zero(score: f64) -> f64 {
    if score.is_finite() {
        score
    } else {
        0.0
    }
}
