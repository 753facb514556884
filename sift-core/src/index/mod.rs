//! TF-IDF indexing and ranking.
//!
//! Layout:
//! - `word_to_documents`: inverted index, word -> (document -> tf)
//! - `document_to_words`: per-document table, document -> (word -> tf),
//!   used for removal in O(document size) and for frequency lookups
//! - document metadata (rating, status) and the ordered set of live ids
//!
//! Threading:
//! - Queries take `&self`. In [`ExecutionMode::Parallel`](sift_types::ExecutionMode)
//!   a single query fans out over the rayon pool; any number of queries may
//!   also run concurrently against one engine.
//! - Mutation takes `&mut self` and so never overlaps a query.

mod api;
mod scoring;
mod search;
mod stats;
mod types;

pub use search::rank_documents;
pub use stats::IndexStats;
pub use types::{DocumentInfo, EngineMetrics, SearchEngine};
