//! Duplicate document removal.
//!
//! Two documents are duplicates when they have the same set of distinct
//! words, regardless of order, repetition or ratings. The document with the
//! lowest id is kept.
//!
//! The fingerprint is the sorted list of distinct words itself, so distinct
//! vocabularies never collide (`{"ab", "c"}` and `{"a", "bc"}` differ).

use rustc_hash::FxHashSet;
use sift_types::DocId;
use tracing::info;

use crate::index::SearchEngine;

/// Removes every document whose vocabulary equals that of a lower id.
///
/// Returns the removed ids in ascending order.
pub fn remove_duplicates(engine: &mut SearchEngine) -> Vec<DocId> {
    let mut duplicates = Vec::new();
    {
        let mut seen: FxHashSet<Vec<&str>> = FxHashSet::default();
        for id in engine.document_ids() {
            // `word_frequencies` is ordered by word, so keys are sorted and unique.
            let fingerprint: Vec<&str> = engine.word_frequencies(id).into_keys().collect();
            if !seen.insert(fingerprint) {
                duplicates.push(id);
            }
        }
    }

    for &id in &duplicates {
        info!(id, "found duplicate document");
        engine.remove_document(id);
    }
    duplicates
}
