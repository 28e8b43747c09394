//! Per-candidate relevance signals and their weighted blend.
//!
//! Four signals are computed independently for every candidate:
//!
//! ```text
//! semantic = w.vector  * knn
//! lexical  = w.keyword * (0.65 * bm25 + 0.35 * overlap)
//! phrase   = w.phrase  * [query is a substring of title]
//! fuzzy    = w.fuzzy   * jaccard(content tokens, title tokens)
//! ```
//!
//! `overlap` is the share of content tokens found in the title. When it is
//! zero for a query with two or more content tokens it becomes `-0.5`,
//! which keeps vector-only matches with no shared words from ranking high.

use std::collections::HashSet;

use crate::config::FusionWeights;
use crate::tokenizer::{content_tokens, tokenize};
use crate::types::ScoreBreakdown;

/// Share of the lexical blend taken by the normalized backend score.
pub const LEXICAL_SCORE_SHARE: f64 = 0.65;
/// Share of the lexical blend taken by content-token overlap.
pub const OVERLAP_SHARE: f64 = 0.35;
/// Subtracted from a zero overlap ratio for multi-token queries.
pub const NO_OVERLAP_PENALTY: f64 = 0.5;

/// Query-derived inputs shared by every candidate of one request.
#[derive(Debug, Clone)]
pub struct QueryProfile {
    /// Lowercased, trimmed query for substring matching.
    phrase: String,
    /// Content tokens in query order (duplicates kept).
    content: Vec<String>,
}

impl QueryProfile {
    pub fn new(query: &str) -> Self {
        Self {
            phrase: query.trim().to_lowercase(),
            content: content_tokens(query),
        }
    }

    pub fn content_tokens(&self) -> &[String] {
        &self.content
    }
}

/// Normalized per-source scores for one candidate. Zero when the source
/// did not return the candidate.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SourceScores {
    pub vector: f64,
    pub lexical: f64,
}

/// Compute the weighted signal breakdown for one candidate title.
pub fn score_candidate(
    query: &QueryProfile,
    title: &str,
    scores: SourceScores,
    weights: &FusionWeights,
) -> ScoreBreakdown {
    let title_tokens = tokenize(title);

    let overlap = overlap_component(&query.content, &title_tokens);
    let phrase = if phrase_match(&query.phrase, title) { 1.0 } else { 0.0 };

    ScoreBreakdown {
        semantic: weights.vector * scores.vector,
        lexical: weights.keyword * (LEXICAL_SCORE_SHARE * scores.lexical + OVERLAP_SHARE * overlap),
        phrase: weights.phrase * phrase,
        fuzzy: weights.fuzzy * jaccard(&query.content, &title_tokens),
    }
}

/// Fraction of `content` tokens present in `title_tokens`.
///
/// Counted over the content list, so a repeated query word counts each time.
pub fn keyword_overlap_ratio(content: &[String], title_tokens: &[String]) -> f64 {
    if content.is_empty() {
        return 0.0;
    }
    let title: HashSet<&str> = title_tokens.iter().map(String::as_str).collect();
    let matched = content
        .iter()
        .filter(|token| title.contains(token.as_str()))
        .count();
    matched as f64 / content.len() as f64
}

/// Overlap ratio with the no-overlap penalty applied.
fn overlap_component(content: &[String], title_tokens: &[String]) -> f64 {
    let ratio = keyword_overlap_ratio(content, title_tokens);
    if ratio == 0.0 && content.len() >= 2 {
        ratio - NO_OVERLAP_PENALTY
    } else {
        ratio
    }
}

/// Returns `true` if the lowercased `phrase` occurs literally in `title`.
///
/// `phrase` must already be lowercased.
pub fn phrase_match(phrase: &str, title: &str) -> bool {
    !phrase.is_empty() && title.to_lowercase().contains(phrase)
}

/// Jaccard similarity of the token sets of `a` and `b`; `0.0` if either is
/// empty.
pub fn jaccard(a: &[String], b: &[String]) -> f64 {
    let left: HashSet<&str> = a.iter().map(String::as_str).collect();
    let right: HashSet<&str> = b.iter().map(String::as_str).collect();
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }
    let intersection = left.intersection(&right).count();
    let union = left.union(&right).count();
    intersection as f64 / union as f64
}
