//! Index types and constructors.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};

use rustc_hash::FxHashMap;
use sift_types::{DocId, DocumentStatus, EngineConfig, Result};

use crate::arena::{Lexicon, WordId};
use crate::query::StopWords;

/// Term frequencies of one word, keyed by document.
pub(crate) type Postings = BTreeMap<DocId, f64>;

/// Metadata kept for every live document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentInfo {
    /// Truncated mean of the ratings supplied at insertion.
    pub rating: i32,
    /// Caller-assigned status.
    pub status: DocumentStatus,
}

/// In-memory TF-IDF search engine.
///
/// Two cross-referencing tables are kept in step on every mutation:
///
/// - `word_to_documents`: word -> document -> term frequency
/// - `document_to_words`: document -> word -> term frequency
///
/// Both are keyed by [`WordId`]s from the same [`Lexicon`], so word text is
/// stored exactly once.
///
/// Queries take `&self` and may run from many threads at once. Adding or
/// removing documents takes `&mut self`, which the borrow checker keeps
/// exclusive of any in-flight query.
#[derive(Debug)]
pub struct SearchEngine {
    pub(crate) lexicon: Lexicon,
    pub(crate) stop_words: StopWords,
    pub(crate) word_to_documents: FxHashMap<WordId, Postings>,
    pub(crate) document_to_words: FxHashMap<DocId, FxHashMap<WordId, f64>>,
    pub(crate) documents: FxHashMap<DocId, DocumentInfo>,
    pub(crate) document_ids: BTreeSet<DocId>,
    pub(crate) config: EngineConfig,
    /// Total number of queries executed
    pub(crate) query_count: AtomicU64,
    /// Total number of documents added
    pub(crate) documents_added: u64,
    /// Total number of documents removed
    pub(crate) documents_removed: u64,
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::with_config(StopWords::default(), EngineConfig::default())
    }
}

impl SearchEngine {
    /// Creates an engine with the given stop words.
    ///
    /// Empty strings and duplicates are ignored.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::InvalidWord` if a stop word contains a control character.
    pub fn new<I, S>(stop_words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self::with_config(
            StopWords::new(stop_words)?,
            EngineConfig::default(),
        ))
    }

    /// Creates an engine from space-separated stop words.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::InvalidWord` if a stop word contains a control character.
    pub fn from_stop_words_text(text: &str) -> Result<Self> {
        Ok(Self::with_config(
            StopWords::from_text(text)?,
            EngineConfig::default(),
        ))
    }

    /// Creates an engine with custom configuration.
    pub fn with_config(stop_words: StopWords, config: EngineConfig) -> Self {
        Self {
            lexicon: Lexicon::new(),
            stop_words,
            word_to_documents: FxHashMap::default(),
            document_to_words: FxHashMap::default(),
            documents: FxHashMap::default(),
            document_ids: BTreeSet::new(),
            config,
            query_count: AtomicU64::new(0),
            documents_added: 0,
            documents_removed: 0,
        }
    }

    /// The active configuration.
    #[inline(always)]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The stop words fixed at construction.
    #[inline(always)]
    pub fn stop_words(&self) -> &StopWords {
        &self.stop_words
    }

    /// Returns basic metrics about the engine's operation.
    #[must_use]
    pub fn metrics(&self) -> EngineMetrics {
        EngineMetrics {
            documents_indexed: self.documents_added,
            documents_removed: self.documents_removed,
            queries_executed: self.query_count.load(Ordering::Relaxed),
            current_doc_count: self.documents.len() as u64,
        }
    }
}

/// Basic operational metrics for the search engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineMetrics {
    /// Total number of documents added, including removed ones.
    pub documents_indexed: u64,
    /// Total number of documents removed.
    pub documents_removed: u64,
    /// Total number of top-document queries executed, including failed ones.
    pub queries_executed: u64,
    /// Current number of documents in the index.
    pub current_doc_count: u64,
}
