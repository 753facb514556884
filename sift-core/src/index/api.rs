//! Public API for adding, removing and inspecting documents.

use std::collections::{btree_set, BTreeMap};
use std::iter::Copied;

use rayon::prelude::*;
use sift_types::{DocId, DocumentStatus, ExecutionMode, Result, SearchError};
use tracing::debug;

use crate::analyzer::tokenizer::{is_valid_word, Tokenizer};
use crate::arena::WordId;
use crate::index::types::{DocumentInfo, Postings, SearchEngine};

/// Integer mean of `ratings`, truncated toward zero.
fn average_rating(id: DocId, ratings: &[i32]) -> Result<i32> {
    if ratings.is_empty() {
        return Err(SearchError::InvalidRatings { id });
    }
    let sum: i64 = ratings.iter().copied().map(i64::from).sum();
    // The mean of i32 values always fits in an i32.
    Ok((sum / ratings.len() as i64) as i32)
}

impl SearchEngine {
    /// Adds a document to the index.
    ///
    /// Term frequency of a word is its number of occurrences divided by the
    /// number of non-stop words in `text`. A text made only of stop words is
    /// accepted and indexed with an empty vocabulary.
    ///
    /// Nothing is modified unless every check passes.
    ///
    /// # Errors
    ///
    /// - `SearchError::InvalidDocumentId` if `id` is negative or already present.
    /// - `SearchError::InvalidWord` if a word contains a control character.
    /// - `SearchError::InvalidRatings` if `ratings` is empty.
    /// - `SearchError::LexiconFull` if the word table has no room for the
    ///   document's new words.
    pub fn add_document(
        &mut self,
        id: DocId,
        text: &str,
        status: DocumentStatus,
        ratings: &[i32],
    ) -> Result<()> {
        if id < 0 {
            return Err(SearchError::InvalidDocumentId {
                id,
                reason: "negative id",
            });
        }
        if self.documents.contains_key(&id) {
            return Err(SearchError::InvalidDocumentId {
                id,
                reason: "id already present",
            });
        }

        let words = self.split_into_words_no_stop(text)?;
        let rating = average_rating(id, ratings)?;

        // Repeated new words are counted once per occurrence; over-counting
        // only rejects earlier.
        let new_words = words
            .iter()
            .filter(|word| self.lexicon.lookup(word).is_none())
            .count();
        if new_words > self.lexicon.remaining_capacity() {
            return Err(SearchError::LexiconFull {
                capacity: self.lexicon.capacity(),
            });
        }

        let inv_word_count = 1.0 / words.len() as f64;
        let document_words = self.document_to_words.entry(id).or_default();
        for word in &words {
            let word_id = self.lexicon.intern(word)?;
            *self
                .word_to_documents
                .entry(word_id)
                .or_default()
                .entry(id)
                .or_insert(0.0) += inv_word_count;
            *document_words.entry(word_id).or_insert(0.0) += inv_word_count;
        }

        self.documents.insert(id, DocumentInfo { rating, status });
        self.document_ids.insert(id);
        self.documents_added += 1;

        debug!(id, words = words.len(), rating, %status, "document added");
        Ok(())
    }

    /// Adds several documents, continuing past failures.
    ///
    /// Returns a tuple of (success_count, error_count) and the last error encountered.
    pub fn add_documents<'t, I>(&mut self, documents: I) -> (usize, usize, Option<SearchError>)
    where
        I: IntoIterator<Item = (DocId, &'t str, DocumentStatus, &'t [i32])>,
    {
        let mut added = 0;
        let mut failed = 0;
        let mut last_error = None;

        for (id, text, status, ratings) in documents {
            match self.add_document(id, text, status, ratings) {
                Ok(()) => added += 1,
                Err(e) => {
                    failed += 1;
                    last_error = Some(e);
                }
            }
        }
        (added, failed, last_error)
    }

    /// Removes a document from every table.
    ///
    /// Returns `false` (and does nothing) if `id` is not present. Cost is
    /// proportional to the document's distinct word count. Interned word
    /// text is kept.
    pub fn remove_document(&mut self, id: DocId) -> bool {
        self.remove_document_with(ExecutionMode::Sequential, id)
    }

    /// [`SearchEngine::remove_document`] with an explicit execution mode.
    ///
    /// In parallel mode the document's posting lists are detached from the
    /// inverted index, pruned on the rayon pool, and the non-empty ones put
    /// back. Each worker owns the lists it touches.
    pub fn remove_document_with(&mut self, mode: ExecutionMode, id: DocId) -> bool {
        let Some(words) = self.document_to_words.remove(&id) else {
            return false;
        };

        match mode {
            ExecutionMode::Sequential => {
                for word_id in words.keys() {
                    if let Some(postings) = self.word_to_documents.get_mut(word_id) {
                        postings.remove(&id);
                        if postings.is_empty() {
                            self.word_to_documents.remove(word_id);
                        }
                    }
                }
            }
            ExecutionMode::Parallel => {
                let mut detached: Vec<(WordId, Postings)> = words
                    .keys()
                    .filter_map(|word_id| self.word_to_documents.remove_entry(word_id))
                    .collect();
                detached.par_iter_mut().for_each(|(_, postings)| {
                    postings.remove(&id);
                });
                self.word_to_documents.extend(
                    detached
                        .into_iter()
                        .filter(|(_, postings)| !postings.is_empty()),
                );
            }
        }
        self.documents.remove(&id);
        self.document_ids.remove(&id);
        self.documents_removed += 1;

        debug!(id, words = words.len(), ?mode, "document removed");
        true
    }

    /// Number of live documents.
    #[inline(always)]
    #[must_use]
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Returns `true` if the index contains no documents.
    #[inline(always)]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Returns `true` if `id` is a live document.
    #[inline(always)]
    pub fn contains(&self, id: DocId) -> bool {
        self.documents.contains_key(&id)
    }

    /// Rating and status of a live document.
    #[inline]
    pub fn document(&self, id: DocId) -> Option<DocumentInfo> {
        self.documents.get(&id).copied()
    }

    /// Live document ids in ascending order.
    #[inline]
    pub fn document_ids(&self) -> Copied<btree_set::Iter<'_, DocId>> {
        self.document_ids.iter().copied()
    }

    /// Term frequency of every word of `id`, ordered by word text.
    ///
    /// Empty for documents that are not present.
    pub fn word_frequencies(&self, id: DocId) -> BTreeMap<&str, f64> {
        self.document_to_words
            .get(&id)
            .map(|words| {
                words
                    .iter()
                    .map(|(&word_id, &freq)| (self.lexicon.resolve(word_id), freq))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn split_into_words_no_stop<'t>(&self, text: &'t str) -> Result<Vec<&'t str>> {
        let mut words = Vec::new();
        let mut invalid = None;
        Tokenizer::new().tokenize(text, |word, _| {
            if invalid.is_some() {
                return;
            }
            if !is_valid_word(word) {
                invalid = Some(word);
            } else if !self.stop_words.contains(word) {
                words.push(word);
            }
        });

        match invalid {
            Some(word) => Err(SearchError::InvalidWord {
                word: word.to_owned(),
            }),
            None => Ok(words),
        }
    }
}

impl<'a> IntoIterator for &'a SearchEngine {
    type Item = DocId;
    type IntoIter = Copied<btree_set::Iter<'a, DocId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.document_ids()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_rating_truncates_toward_zero() {
        assert_eq!(average_rating(0, &[8, -3]), Ok(2));
        assert_eq!(average_rating(0, &[7, 2, 7]), Ok(5));
        assert_eq!(average_rating(0, &[5, -12, 2, 1]), Ok(-1));
        assert_eq!(average_rating(0, &[-7, 0]), Ok(-3));
        assert_eq!(average_rating(0, &[i32::MAX, i32::MAX]), Ok(i32::MAX));
        assert_eq!(
            average_rating(4, &[]),
            Err(SearchError::InvalidRatings { id: 4 })
        );
    }
}
