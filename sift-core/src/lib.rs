//! In-memory TF-IDF search engine.
//!
//! Documents are short texts with an integer id, a [`DocumentStatus`] and a
//! list of ratings. Queries are space-separated words; `-word` excludes every
//! document containing `word`. Results are ranked by TF-IDF relevance, ties
//! broken by rating, and capped at five by default.
//!
//! ```
//! use sift_core::{DocumentStatus, SearchEngine};
//!
//! let mut engine = SearchEngine::new(["and"]).unwrap();
//! engine.add_document(0, "white cat and fancy collar", DocumentStatus::Active, &[8, -3]).unwrap();
//! engine.add_document(1, "fluffy cat fluffy tail", DocumentStatus::Active, &[7, 2, 7]).unwrap();
//!
//! let top = engine.find_top_documents("fluffy cat -collar").unwrap();
//! assert_eq!(top.len(), 1);
//! assert_eq!(top[0].id, 1);
//! ```
//!
//! Modules:
//! - [`arena`]: append-only word storage and the deduplicating lexicon
//! - [`analyzer`]: whitespace tokenizer and word validation
//! - [`query`]: query parsing (sequential and parallel forms)
//! - [`accumulator`]: sharded relevance accumulator for parallel scoring
//! - [`index`]: the engine itself
//! - [`batch`], [`dedup`]: helpers built on the public engine API

pub mod accumulator;
pub mod analyzer;
pub mod arena;
pub mod batch;
pub mod dedup;
pub mod index;
pub mod query;

pub use batch::{process_queries, process_queries_joined};
pub use dedup::remove_duplicates;
pub use index::{DocumentInfo, EngineMetrics, IndexStats, SearchEngine};
pub use sift_types::{
    DocId, Document, DocumentStatus, EngineConfig, ExecutionMode, Result, SearchError,
};
