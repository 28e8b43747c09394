//! Candidate merging by document id.
//!
//! Vector hits are visited first, then lexical hits. The first hit seen for
//! an id fixes the candidate's title; later hits for the same id only add
//! their source. Insertion order is preserved and later serves as the
//! tie-break order for equal final scores.

use std::collections::HashMap;

use crate::types::{RetrievalHit, RetrievalSource};

/// A unique document in the union of both hit lists.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// The first hit seen for this document id.
    pub hit: RetrievalHit,
    /// Every source that returned this id, in visiting order.
    pub sources: Vec<RetrievalSource>,
}

impl Candidate {
    pub fn document_id(&self) -> &str {
        &self.hit.document_id
    }

    pub fn title(&self) -> &str {
        &self.hit.title
    }
}

/// Union both hit lists into insertion-ordered, id-unique candidates.
///
/// Hits with a blank document id are dropped.
pub fn merge_candidates(lexical: &[RetrievalHit], vector: &[RetrievalHit]) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = Vec::with_capacity(lexical.len() + vector.len());
    let mut positions: HashMap<String, usize> = HashMap::with_capacity(lexical.len() + vector.len());

    let visiting_order = vector
        .iter()
        .map(|hit| (hit, RetrievalSource::Vector))
        .chain(lexical.iter().map(|hit| (hit, RetrievalSource::Lexical)));

    for (hit, source) in visiting_order {
        if !hit.has_valid_id() {
            tracing::debug!(%source, "skipping hit without document id");
            continue;
        }
        match positions.get(&hit.document_id) {
            Some(&index) => {
                let sources = &mut candidates[index].sources;
                if !sources.contains(&source) {
                    sources.push(source);
                }
            }
            None => {
                positions.insert(hit.document_id.clone(), candidates.len());
                candidates.push(Candidate {
                    hit: hit.clone(),
                    sources: vec![source],
                });
            }
        }
    }

    candidates
}
