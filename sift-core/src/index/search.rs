//! Top-document search and per-document matching.

use std::sync::atomic::Ordering;

use rayon::prelude::*;
use sift_types::{DocId, Document, DocumentStatus, EngineConfig, ExecutionMode, Result, SearchError};
use tracing::trace;

use crate::arena::WordId;
use crate::index::types::SearchEngine;
use crate::query::{ParallelQuery, Query};

/// Sorts `documents` best first and keeps the top `config.max_results`.
///
/// Documents are ordered by relevance, then split into bands: a band starts
/// at its most relevant document and holds every following document less
/// than `config.relevance_epsilon` below it. Each band is ordered by rating,
/// higher first. Both sorts are stable, so documents that still tie keep
/// their relevance order and then their incoming (ascending id) order.
pub fn rank_documents(documents: &mut Vec<Document>, config: &EngineConfig) {
    let epsilon = config.relevance_epsilon;
    documents.sort_by(|a, b| b.relevance.total_cmp(&a.relevance));

    // Bands past the cut cannot reach the output.
    let mut start = 0;
    while start < documents.len().min(config.max_results) {
        let anchor = documents[start].relevance;
        let end = documents[start + 1..]
            .iter()
            .position(|document| anchor - document.relevance >= epsilon)
            .map_or(documents.len(), |offset| start + 1 + offset);
        documents[start..end].sort_by(|a, b| b.rating.cmp(&a.rating));
        start = end;
    }
    documents.truncate(config.max_results);
}

impl SearchEngine {
    /// Active documents matching `raw_query`, best first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query is malformed; see [`crate::query::parse_query_word`].
    pub fn find_top_documents(&self, raw_query: &str) -> Result<Vec<Document>> {
        self.find_top_documents_by_status(raw_query, DocumentStatus::Active)
    }

    /// Documents with `status` matching `raw_query`, best first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query is malformed.
    pub fn find_top_documents_by_status(
        &self,
        raw_query: &str,
        status: DocumentStatus,
    ) -> Result<Vec<Document>> {
        self.find_top_documents_filtered(raw_query, move |_, document_status, _| {
            document_status == status
        })
    }

    /// Documents accepted by `predicate` matching `raw_query`, best first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query is malformed.
    pub fn find_top_documents_filtered<P>(&self, raw_query: &str, predicate: P) -> Result<Vec<Document>>
    where
        P: Fn(DocId, DocumentStatus, i32) -> bool + Sync,
    {
        self.find_top_documents_with(ExecutionMode::Sequential, raw_query, predicate)
    }

    /// Full form: documents accepted by `predicate(id, status, rating)` that
    /// match `raw_query`, scored in `mode`, best first and at most
    /// `config.max_results` long.
    ///
    /// # Errors
    ///
    /// Returns an error if the query is malformed.
    pub fn find_top_documents_with<P>(
        &self,
        mode: ExecutionMode,
        raw_query: &str,
        predicate: P,
    ) -> Result<Vec<Document>>
    where
        P: Fn(DocId, DocumentStatus, i32) -> bool + Sync,
    {
        self.query_count.fetch_add(1, Ordering::Relaxed);

        let relevance = match mode {
            ExecutionMode::Sequential => {
                let query = Query::parse(raw_query, &self.stop_words)?;
                self.score_sequential(&query, &predicate)
            }
            ExecutionMode::Parallel => {
                let query = ParallelQuery::parse(raw_query, &self.stop_words)?;
                self.score_parallel(&query, &predicate)
            }
        };

        let candidates = relevance.len();
        let mut documents: Vec<Document> = relevance
            .into_iter()
            .map(|(id, relevance)| {
                let rating = self.documents.get(&id).map_or(0, |info| info.rating);
                Document::new(id, relevance, rating)
            })
            .collect();
        rank_documents(&mut documents, &self.config);

        trace!(?mode, candidates, returned = documents.len(), "query executed");
        Ok(documents)
    }

    /// Plus words of `raw_query` found in document `id`, plus its status.
    ///
    /// The word list is sorted and free of duplicates. It is empty if the
    /// document contains any minus word.
    ///
    /// # Errors
    ///
    /// - `SearchError::DocumentNotFound` if `id` is not present.
    /// - A parse error if the query is malformed.
    pub fn match_document(&self, raw_query: &str, id: DocId) -> Result<(Vec<&str>, DocumentStatus)> {
        self.match_document_with(ExecutionMode::Sequential, raw_query, id)
    }

    /// [`SearchEngine::match_document`] with an explicit execution mode.
    ///
    /// # Errors
    ///
    /// Same as [`SearchEngine::match_document`].
    pub fn match_document_with(
        &self,
        mode: ExecutionMode,
        raw_query: &str,
        id: DocId,
    ) -> Result<(Vec<&str>, DocumentStatus)> {
        let status = self
            .documents
            .get(&id)
            .map(|info| info.status)
            .ok_or(SearchError::DocumentNotFound { id })?;

        let matched = match mode {
            ExecutionMode::Sequential => {
                let query = Query::parse(raw_query, &self.stop_words)?;
                if query.minus_words.iter().any(|word| self.find_in_document(word, id).is_some()) {
                    return Ok((Vec::new(), status));
                }
                query
                    .plus_words
                    .iter()
                    .filter_map(|word| self.find_in_document(word, id))
                    .map(|word_id| self.lexicon.resolve(word_id))
                    .collect()
            }
            ExecutionMode::Parallel => {
                let query = ParallelQuery::parse(raw_query, &self.stop_words)?;
                if query
                    .minus_words
                    .par_iter()
                    .any(|word| self.find_in_document(word, id).is_some())
                {
                    return Ok((Vec::new(), status));
                }
                // Collect keeps the sorted order of `plus_words`.
                query
                    .plus_words
                    .par_iter()
                    .filter_map(|word| self.find_in_document(word, id))
                    .map(|word_id| self.lexicon.resolve(word_id))
                    .collect()
            }
        };

        Ok((matched, status))
    }

    /// Interned id of `word` if its posting list contains `id`.
    #[inline]
    fn find_in_document(&self, word: &str, id: DocId) -> Option<WordId> {
        let word_id = self.lexicon.lookup(word)?;
        self.word_to_documents
            .get(&word_id)
            .is_some_and(|postings| postings.contains_key(&id))
            .then_some(word_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_orders_and_truncates() {
        let mut documents: Vec<Document> = (0..8)
            .map(|id| Document::new(id, f64::from(id % 3), id))
            .collect();
        rank_documents(&mut documents, &EngineConfig::default());

        let ids: Vec<DocId> = documents.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![5, 2, 7, 4, 1]);
    }

    #[test]
    fn rank_ties_within_epsilon_use_rating() {
        let mut documents = vec![
            Document::new(0, 0.3, 1),
            Document::new(1, 0.3 + 3e-7, 9),
            Document::new(2, 0.3 - 3e-7, 4),
        ];
        rank_documents(&mut documents, &EngineConfig::default());
        let ids: Vec<DocId> = documents.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![1, 2, 0]);
    }

    #[test]
    fn rank_chained_near_ties_form_bands() {
        // Neighbours are 0.6e-6 apart, so every pair is a tie but every
        // second document is not. Bands are anchored at 39, 37, 35, ...
        let mut documents: Vec<Document> = (0..40)
            .map(|id| Document::new(id, f64::from(id) * 0.6e-6, (id * 13) % 40 - 20))
            .collect();
        rank_documents(&mut documents, &EngineConfig::default());

        let ids: Vec<DocId> = documents.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![39, 38, 36, 37, 35]);
    }

    #[test]
    fn rank_many_near_ties_is_a_total_order() {
        let config = EngineConfig {
            max_results: usize::MAX,
            ..EngineConfig::default()
        };
        let mut documents: Vec<Document> = (0..500)
            .map(|id| {
                let rating = (id * 7919) % 97 - 48;
                Document::new(id, 1.0 + f64::from(id % 50) * 0.3e-6, rating)
            })
            .collect();
        rank_documents(&mut documents, &config);
        assert_eq!(documents.len(), 500);

        // Fifty relevance levels 0.3e-6 apart, ten documents each. A band
        // spans four levels (0.9e-6), so each band is forty documents.
        for (band, chunk) in documents.chunks(40).enumerate() {
            let top = 49 - 4 * band as i32;
            for document in chunk {
                let level = document.id % 50;
                assert!(level <= top && level > top - 4, "{document} in band {band}");
            }
            for pair in chunk.windows(2) {
                assert!(pair[0].rating >= pair[1].rating, "{} before {}", pair[0], pair[1]);
            }
        }
    }

    #[test]
    fn rank_with_zero_epsilon_orders_by_relevance() {
        let config = EngineConfig {
            relevance_epsilon: 0.0,
            ..EngineConfig::default()
        };
        let mut documents = vec![
            Document::new(0, 0.1, 9),
            Document::new(1, 0.2, 1),
            Document::new(2, 0.1, 3),
        ];
        rank_documents(&mut documents, &config);
        let ids: Vec<DocId> = documents.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![1, 0, 2]);
    }

    #[test]
    fn rank_respects_configured_cap() {
        let config = EngineConfig {
            max_results: 2,
            ..EngineConfig::default()
        };
        let mut documents: Vec<Document> =
            (0..4).map(|id| Document::new(id, 1.0, id)).collect();
        rank_documents(&mut documents, &config);
        assert_eq!(documents.len(), 2);
        assert_eq!(documents[0].id, 3);
    }
}
