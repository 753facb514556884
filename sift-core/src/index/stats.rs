//! Statistics and IndexStats.

use crate::index::types::SearchEngine;

/// A snapshot of index statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexStats {
    /// Number of live documents.
    pub num_documents: usize,
    /// Number of words with at least one live document.
    pub num_indexed_words: usize,
    /// Number of distinct words ever interned. Never shrinks.
    pub num_interned_words: usize,
    /// Bytes of word text held by the arena.
    pub arena_bytes: usize,
    /// Total (word, document) pairs in the inverted index.
    pub total_postings: usize,
}

impl SearchEngine {
    /// Returns index statistics.
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            num_documents: self.documents.len(),
            num_indexed_words: self.word_to_documents.len(),
            num_interned_words: self.lexicon.len(),
            arena_bytes: self.lexicon.arena().bytes(),
            total_postings: self.word_to_documents.values().map(|p| p.len()).sum(),
        }
    }
}

impl IndexStats {
    /// Rough memory footprint of word text and both frequency tables.
    ///
    /// Each posting is stored twice (inverted and per-document), each as an
    /// id plus an `f64`.
    pub fn memory_usage_bytes(&self) -> usize {
        let posting = std::mem::size_of::<u32>() + std::mem::size_of::<f64>();
        self.arena_bytes + self.total_postings * posting * 2
    }
}

impl core::fmt::Display for IndexStats {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{} docs, {} words ({} interned, {} bytes), {} postings",
            self.num_documents,
            self.num_indexed_words,
            self.num_interned_words,
            self.arena_bytes,
            self.total_postings
        )
    }
}
