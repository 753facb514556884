//! Batch query fan-out.
//!
//! Runs many independent queries against one engine on the rayon pool. Each
//! query is itself executed in [`ExecutionMode::Parallel`], so the pool is
//! shared between queries and the plus words inside them.

use rayon::prelude::*;
use sift_types::{Document, DocumentStatus, ExecutionMode, Result};
use tracing::debug;

use crate::index::SearchEngine;

fn run_query(engine: &SearchEngine, query: &str) -> Result<Vec<Document>> {
    engine.find_top_documents_with(ExecutionMode::Parallel, query, |_, status, _| {
        status == DocumentStatus::Active
    })
}

/// Top Active documents for every query, in query order.
///
/// # Errors
///
/// Returns an error if any query is malformed; which one is reported is
/// unspecified when several are.
pub fn process_queries<S>(engine: &SearchEngine, queries: &[S]) -> Result<Vec<Vec<Document>>>
where
    S: AsRef<str> + Sync,
{
    debug!(queries = queries.len(), "processing query batch");
    queries
        .par_iter()
        .map(|query| run_query(engine, query.as_ref()))
        .collect()
}

/// Results of [`process_queries`] concatenated in query order.
///
/// Lists are not re-ranked against each other.
///
/// # Errors
///
/// Same as [`process_queries`].
pub fn process_queries_joined<S>(engine: &SearchEngine, queries: &[S]) -> Result<Vec<Document>>
where
    S: AsRef<str> + Sync,
{
    Ok(process_queries(engine, queries)?
        .into_iter()
        .flatten()
        .collect())
}
