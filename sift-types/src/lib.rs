//! Core types for the Sift search engine.
//!
//! This crate holds the value types shared between the engine and its
//! callers. Keeping them separate lets tools and tests depend on the
//! result and error shapes without pulling in the indexing code.
//!
//! - [`Document`]: a ranked search hit
//! - [`DocumentStatus`]: caller-assigned moderation state of a document
//! - [`SearchError`]: every failure the engine can report
//! - [`EngineConfig`]: ranking and concurrency knobs

#![warn(missing_docs)]

use core::cmp::Ordering;
use core::fmt;

/// Unique document identifier.
///
/// Signed so that callers can hand in whatever integer they have; the engine
/// rejects negative ids at insertion time.
pub type DocId = i32;

/// Default cap on the number of documents returned by a single query.
pub const MAX_RESULT_DOCUMENT_COUNT: usize = 5;

/// Relevances closer than this are considered equal during ranking.
pub const RELEVANCE_EPSILON: f64 = 1e-6;

/// Result alias used throughout the engine.
pub type Result<T, E = SearchError> = core::result::Result<T, E>;

/// Moderation state of a document. Assigned by the caller, never changed by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DocumentStatus {
    /// Visible in default searches.
    #[default]
    Active,
    /// Indexed but considered off-topic.
    Irrelevant,
    /// Blocked by moderation.
    Banned,
    /// Logically removed by the owner.
    Removed,
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DocumentStatus::Active => "active",
            DocumentStatus::Irrelevant => "irrelevant",
            DocumentStatus::Banned => "banned",
            DocumentStatus::Removed => "removed",
        };
        f.write_str(name)
    }
}

/// A ranked search hit.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Document {
    /// Document identifier
    pub id: DocId,
    /// Sum of TF-IDF weights over matched query words
    pub relevance: f64,
    /// Truncated mean of the ratings supplied at insertion
    pub rating: i32,
}

impl Document {
    /// Creates a new search hit.
    #[inline(always)]
    pub const fn new(id: DocId, relevance: f64, rating: i32) -> Self {
        Self {
            id,
            relevance,
            rating,
        }
    }

    /// Pairwise ranking comparator: higher relevance first, and when two
    /// relevances are within `epsilon` of each other, higher rating first.
    ///
    /// `Ordering::Less` means `self` ranks before `other`.
    ///
    /// The epsilon band makes this non-transitive across chains of
    /// near-equal relevances, so it must not be handed to a sort. Ranking a
    /// list goes through `sift_core::rank_documents`, which anchors each band
    /// on its most relevant member.
    #[inline]
    pub fn relevance_order(&self, other: &Self, epsilon: f64) -> Ordering {
        if (self.relevance - other.relevance).abs() < epsilon {
            other.rating.cmp(&self.rating)
        } else {
            other.relevance.total_cmp(&self.relevance)
        }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ document_id = {}, relevance = {}, rating = {} }}",
            self.id, self.relevance, self.rating
        )
    }
}

/// How a query is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// Single thread, fully deterministic.
    #[default]
    Sequential,
    /// Plus words are scored on the rayon pool through a sharded accumulator.
    Parallel,
}

/// Errors reported by the engine.
///
/// Every variant is an input error surfaced synchronously; nothing here is
/// transient or worth retrying.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// The id is negative or already present.
    #[error("invalid document id {id}: {reason}")]
    InvalidDocumentId {
        /// The rejected id.
        id: DocId,
        /// Why it was rejected.
        reason: &'static str,
    },
    /// A document, stop or query word contains a control character.
    #[error("word {word:?} contains control characters")]
    InvalidWord {
        /// The offending word.
        word: String,
    },
    /// A query token is malformed.
    #[error("invalid query word {token:?}: {reason}")]
    InvalidQuery {
        /// The offending token, as written in the query.
        token: String,
        /// Why it was rejected.
        reason: &'static str,
    },
    /// No ratings were supplied, so no average can be computed.
    #[error("document {id} has no ratings")]
    InvalidRatings {
        /// The document being added.
        id: DocId,
    },
    /// The word table cannot hold the new words of a document.
    #[error("word table is full ({capacity} distinct words)")]
    LexiconFull {
        /// Maximum number of distinct words.
        capacity: usize,
    },
    /// The operation needs a document that is not in the index.
    #[error("document {id} not found")]
    DocumentNotFound {
        /// The missing id.
        id: DocId,
    },
}

/// Engine configuration options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Maximum number of documents returned by a query.
    /// Default: [`MAX_RESULT_DOCUMENT_COUNT`]
    pub max_results: usize,
    /// Relevances closer than this are tie-broken by rating.
    /// Default: [`RELEVANCE_EPSILON`]
    pub relevance_epsilon: f64,
    /// Number of independently locked shards used by parallel scoring.
    pub accumulator_shards: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_results: MAX_RESULT_DOCUMENT_COUNT,
            relevance_epsilon: RELEVANCE_EPSILON,
            accumulator_shards: 128,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn higher_relevance_ranks_first() {
        let a = Document::new(1, 0.9, 0);
        let b = Document::new(2, 0.5, 10);
        assert_eq!(a.relevance_order(&b, RELEVANCE_EPSILON), Ordering::Less);
        assert_eq!(b.relevance_order(&a, RELEVANCE_EPSILON), Ordering::Greater);
    }

    #[test]
    fn near_equal_relevance_breaks_tie_by_rating() {
        let a = Document::new(1, 0.5, 2);
        let b = Document::new(2, 0.5 + 1e-9, 7);
        assert_eq!(a.relevance_order(&b, RELEVANCE_EPSILON), Ordering::Greater);
        assert_eq!(b.relevance_order(&a, RELEVANCE_EPSILON), Ordering::Less);

        let c = Document::new(3, 0.5, 2);
        assert_eq!(a.relevance_order(&c, RELEVANCE_EPSILON), Ordering::Equal);
    }

    #[test]
    fn document_display() {
        let doc = Document::new(3, 0.5, -1);
        assert_eq!(
            doc.to_string(),
            "{ document_id = 3, relevance = 0.5, rating = -1 }"
        );
    }

    #[test]
    fn error_messages() {
        let err = SearchError::InvalidDocumentId {
            id: -1,
            reason: "negative",
        };
        assert_eq!(err.to_string(), "invalid document id -1: negative");

        let err = SearchError::InvalidWord {
            word: "a\u{1}b".to_string(),
        };
        assert!(err.to_string().contains("control characters"));

        assert_eq!(
            SearchError::LexiconFull { capacity: 3 }.to_string(),
            "word table is full (3 distinct words)"
        );
        assert_eq!(
            SearchError::DocumentNotFound { id: 7 }.to_string(),
            "document 7 not found"
        );
    }

    #[test]
    fn config_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.max_results, 5);
        assert_eq!(config.relevance_epsilon, 1e-6);
        assert!(config.accumulator_shards > 0);
        assert_eq!(ExecutionMode::default(), ExecutionMode::Sequential);
        assert_eq!(DocumentStatus::default(), DocumentStatus::Active);
    }
}
