//! Fusion orchestrator: concurrent retrieval, merge, normalize, score, rank.
//!
//! This module runs the lexical and vector retrieval calls concurrently,
//! merges their hits by document id, normalizes each source's scores,
//! blends four relevance signals per candidate and returns a sorted,
//! truncated, explainable result list.

pub mod merge;
pub mod normalize;
pub mod scoring;
pub mod search;
