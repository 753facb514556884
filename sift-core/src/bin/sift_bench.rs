//! Query Benchmarking Tool
//!
//! Indexes a text corpus and measures query throughput in both execution
//! modes, plus the batch fan-out.
//!
//! ## Usage
//!
//! ```bash
//! # One document per line; queries default to a sample of corpus words
//! ./target/release/sift_bench /path/to/corpus.txt
//!
//! # Explicit queries, one per line
//! ./target/release/sift_bench /path/to/corpus.txt /path/to/queries.txt
//!
//! # Stop words, space separated
//! SIFT_STOP_WORDS="a an the of" ./target/release/sift_bench corpus.txt
//! ```
//!
//! Set `RUST_LOG=sift_core=debug` to see engine events.
//!
//! ## Example Output
//!
//! ```text
//! === Sequential ===
//! --------------------------------
//! Mode        : Sequential
//! Elapsed     : 0.052 s
//! Queries     : 1_000
//! Queries/sec : 19_230
//! --------------------------------
//! ```

use std::env;
use std::fs;
use std::time::{Duration, Instant};

use sift_core::{
    process_queries, remove_duplicates, DocId, DocumentStatus, ExecutionMode, SearchEngine,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const WARMUP_RUNS: usize = 1;
const MEASURE_RUNS: usize = 5;
const SAMPLE_QUERIES: usize = 1_000;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: sift_bench <corpus> [queries]");
        std::process::exit(1);
    }

    let stop_words = env::var("SIFT_STOP_WORDS").unwrap_or_default();
    let mut engine = SearchEngine::from_stop_words_text(&stop_words)?;

    println!("Loading corpus...");
    let corpus = fs::read_to_string(&args[1])?;
    let started = Instant::now();
    let mut skipped = 0usize;
    for (line, text) in corpus.lines().enumerate() {
        let id = DocId::try_from(line)?;
        let ratings = [(line % 10) as i32 - 3];
        if let Err(e) = engine.add_document(id, text, DocumentStatus::Active, &ratings) {
            warn!(line, error = %e, "skipping document");
            skipped += 1;
        }
    }
    info!(elapsed = ?started.elapsed(), skipped, "corpus indexed");

    let removed = remove_duplicates(&mut engine);
    println!("Index      : {}", engine.stats());
    println!("Duplicates : {}\n", fmt_count(removed.len() as u64));

    let queries: Vec<String> = match args.get(2) {
        Some(path) => fs::read_to_string(path)?
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_owned)
            .collect(),
        None => sample_queries(&engine),
    };
    if queries.is_empty() {
        eprintln!("No queries to run");
        std::process::exit(1);
    }

    bench_mode(&engine, &queries, ExecutionMode::Sequential)?;
    bench_mode(&engine, &queries, ExecutionMode::Parallel)?;
    bench_batch(&engine, &queries)?;

    Ok(())
}

/// Builds queries from the vocabulary of the first documents: two plus
/// words and one minus word each.
fn sample_queries(engine: &SearchEngine) -> Vec<String> {
    engine
        .document_ids()
        .filter_map(|id| {
            let words: Vec<&str> = engine.word_frequencies(id).into_keys().collect();
            match words.as_slice() {
                [a, b, c, ..] => Some(format!("{a} {c} -{b}")),
                [a, b] => Some(format!("{a} {b}")),
                _ => None,
            }
        })
        .take(SAMPLE_QUERIES)
        .collect()
}

fn bench_mode(
    engine: &SearchEngine,
    queries: &[String],
    mode: ExecutionMode,
) -> sift_core::Result<()> {
    println!("=== {:?} ===", mode);

    let run = || -> sift_core::Result<u64> {
        let mut hits = 0u64;
        for query in queries {
            hits += engine
                .find_top_documents_with(mode, query, |_, status, _| {
                    status == DocumentStatus::Active
                })?
                .len() as u64;
        }
        Ok(std::hint::black_box(hits))
    };

    for _ in 0..WARMUP_RUNS {
        run()?;
    }

    let mut hits = 0u64;
    let mut total = Duration::ZERO;
    for _ in 0..MEASURE_RUNS {
        let start = Instant::now();
        hits = run()?;
        total += start.elapsed();
    }

    print_perf(&format!("{:?}", mode), queries.len(), total / MEASURE_RUNS as u32, hits);
    Ok(())
}

fn bench_batch(engine: &SearchEngine, queries: &[String]) -> sift_core::Result<()> {
    println!("=== Batch ===");

    for _ in 0..WARMUP_RUNS {
        std::hint::black_box(process_queries(engine, queries)?);
    }

    let mut hits = 0u64;
    let mut total = Duration::ZERO;
    for _ in 0..MEASURE_RUNS {
        let start = Instant::now();
        let results = process_queries(engine, queries)?;
        total += start.elapsed();
        hits = results.iter().map(|r| r.len() as u64).sum();
    }

    print_perf("Batch", queries.len(), total / MEASURE_RUNS as u32, hits);
    Ok(())
}

fn print_perf(label: &str, queries: usize, elapsed: Duration, hits: u64) {
    let secs = elapsed.as_secs_f64();

    println!("--------------------------------");
    println!("Mode        : {}", label);
    println!("Elapsed     : {:.3} s", secs);
    println!("Queries     : {}", fmt_count(queries as u64));
    println!("Queries/sec : {}", fmt_count((queries as f64 / secs) as u64));
    println!("Hits        : {}", fmt_count(hits));
    println!("--------------------------------\n");
}

fn fmt_count(n: u64) -> String {
    let s = n.to_string();
    let mut out = String::with_capacity(s.len() + s.len() / 3);

    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push('_');
        }
        out.push(ch);
    }

    out.chars().rev().collect()
}
