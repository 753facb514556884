//! TF-IDF scoring.
//!
//! Relevance of a document is the sum, over the query's plus words it
//! contains, of `tf * idf`. Only documents accepted by the caller's predicate
//! accumulate relevance; any document holding a minus word is dropped
//! afterwards regardless of its score.

use std::collections::BTreeMap;

use rayon::prelude::*;
use sift_types::{DocId, DocumentStatus};

use crate::accumulator::ShardedAccumulator;
use crate::index::types::{Postings, SearchEngine};
use crate::query::{ParallelQuery, Query};

impl SearchEngine {
    /// Postings of `word`, if any live document contains it.
    #[inline]
    pub(crate) fn postings(&self, word: &str) -> Option<&Postings> {
        let word_id = self.lexicon.lookup(word)?;
        self.word_to_documents.get(&word_id)
    }

    /// `ln(N / df)` for a posting list taken from this index.
    #[inline(always)]
    fn idf(&self, postings: &Postings) -> f64 {
        debug_assert!(!postings.is_empty(), "empty posting lists are pruned on removal");
        (self.documents.len() as f64 / postings.len() as f64).ln()
    }

    /// Inverse document frequency of `word`.
    ///
    /// `None` when no document contains the word.
    pub fn compute_idf(&self, word: &str) -> Option<f64> {
        self.postings(word).map(|postings| self.idf(postings))
    }

    #[inline(always)]
    fn accepts<P>(&self, id: DocId, predicate: &P) -> bool
    where
        P: Fn(DocId, DocumentStatus, i32) -> bool,
    {
        self.documents
            .get(&id)
            .is_some_and(|info| predicate(id, info.status, info.rating))
    }

    /// Scores `query` on the calling thread.
    pub(crate) fn score_sequential<P>(&self, query: &Query<'_>, predicate: &P) -> BTreeMap<DocId, f64>
    where
        P: Fn(DocId, DocumentStatus, i32) -> bool,
    {
        let mut relevance = BTreeMap::new();

        for word in &query.plus_words {
            let Some(postings) = self.postings(word) else {
                continue;
            };
            let idf = self.idf(postings);
            for (&id, &term_freq) in postings {
                if self.accepts(id, predicate) {
                    *relevance.entry(id).or_insert(0.0) += term_freq * idf;
                }
            }
        }

        for word in &query.minus_words {
            if let Some(postings) = self.postings(word) {
                for id in postings.keys() {
                    relevance.remove(id);
                }
            }
        }

        relevance
    }

    /// Scores `query` on the rayon pool.
    ///
    /// Plus words are spread across workers, which add into a
    /// [`ShardedAccumulator`]. Minus-word postings are gathered in parallel
    /// too, but removal from the merged map happens on the calling thread.
    pub(crate) fn score_parallel<P>(
        &self,
        query: &ParallelQuery<'_>,
        predicate: &P,
    ) -> BTreeMap<DocId, f64>
    where
        P: Fn(DocId, DocumentStatus, i32) -> bool + Sync,
    {
        let accumulator = ShardedAccumulator::new(self.config.accumulator_shards);

        query.plus_words.par_iter().for_each(|word| {
            let Some(postings) = self.postings(word) else {
                return;
            };
            let idf = self.idf(postings);
            for (&id, &term_freq) in postings {
                if self.accepts(id, predicate) {
                    accumulator.add_to(id, term_freq * idf);
                }
            }
        });

        let mut relevance = accumulator.merge();
        if relevance.is_empty() {
            return relevance;
        }

        let excluded: Vec<DocId> = query
            .minus_words
            .par_iter()
            .filter_map(|word| self.postings(word))
            .flat_map_iter(|postings| postings.keys().copied())
            .collect();
        for id in excluded {
            relevance.remove(&id);
        }

        relevance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_types::DocumentStatus::Active;

    fn any(_: DocId, _: DocumentStatus, _: i32) -> bool {
        true
    }

    fn engine() -> SearchEngine {
        let mut engine = SearchEngine::default();
        engine
            .add_document(1, "cat in the city", Active, &[1])
            .expect("should add doc");
        engine
            .add_document(2, "dog in the city", Active, &[1])
            .expect("should add doc");
        engine
            .add_document(3, "cat cat dog", Active, &[1])
            .expect("should add doc");
        engine
    }

    #[test]
    fn idf_matches_definition() {
        let engine = engine();
        let idf = engine.compute_idf("cat").expect("indexed word");
        assert!((idf - (3.0f64 / 2.0).ln()).abs() < 1e-12);
        assert_eq!(engine.compute_idf("city").map(|v| v > 0.0), Some(true));
        assert_eq!(engine.compute_idf("parrot"), None);
    }

    #[test]
    fn word_in_every_document_scores_zero() {
        let mut engine = SearchEngine::default();
        engine.add_document(0, "a b", Active, &[1]).expect("should add doc");
        engine.add_document(1, "a c", Active, &[1]).expect("should add doc");

        let query = Query::parse("a", engine.stop_words()).expect("valid");
        let relevance = engine.score_sequential(&query, &any);
        assert_eq!(relevance.len(), 2);
        assert!(relevance.values().all(|&r| r == 0.0));
    }

    #[test]
    fn sequential_accumulates_tf_idf() {
        let engine = engine();
        let query = Query::parse("cat dog", engine.stop_words()).expect("valid");
        let relevance = engine.score_sequential(&query, &any);

        let idf = (3.0f64 / 2.0).ln();
        assert!((relevance[&1] - 0.25 * idf).abs() < 1e-12);
        assert!((relevance[&2] - 0.25 * idf).abs() < 1e-12);
        assert!((relevance[&3] - (2.0 / 3.0 + 1.0 / 3.0) * idf).abs() < 1e-12);
    }

    #[test]
    fn minus_words_remove_scored_documents() {
        let engine = engine();
        let query = Query::parse("city -cat", engine.stop_words()).expect("valid");
        let relevance = engine.score_sequential(&query, &any);
        assert_eq!(relevance.keys().copied().collect::<Vec<_>>(), vec![2]);

        let query = ParallelQuery::parse("city -cat", engine.stop_words()).expect("valid");
        let relevance = engine.score_parallel(&query, &any);
        assert_eq!(relevance.keys().copied().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn predicate_filters_before_accumulation() {
        let engine = engine();
        let query = Query::parse("cat dog", engine.stop_words()).expect("valid");
        let relevance = engine.score_sequential(&query, &|id: DocId, _, _| id != 3);
        assert!(!relevance.contains_key(&3));
        assert_eq!(relevance.len(), 2);
    }

    #[test]
    fn parallel_agrees_with_sequential() {
        let mut engine = SearchEngine::default();
        for i in 0..200 {
            let text = format!("w{} w{} w{} common", i % 7, i % 11, i % 13);
            engine
                .add_document(i, &text, Active, &[i])
                .expect("should add doc");
        }

        let text = "w1 w2 w3 w4 w5 w6 common -w10";
        let sequential = engine.score_sequential(
            &Query::parse(text, engine.stop_words()).expect("valid"),
            &any,
        );
        let parallel = engine.score_parallel(
            &ParallelQuery::parse(text, engine.stop_words()).expect("valid"),
            &any,
        );

        assert_eq!(
            sequential.keys().collect::<Vec<_>>(),
            parallel.keys().collect::<Vec<_>>()
        );
        for (id, value) in &sequential {
            assert!((value - parallel[id]).abs() < 1e-9, "doc {id} diverged");
        }
    }
}
