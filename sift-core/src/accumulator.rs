//! Sharded relevance accumulator for parallel scoring.
//!
//! Parallel scoring walks different plus words on different threads, and
//! those words share documents. One lock around one map would serialize every
//! update, so the id space is split across independently locked shards and
//! a writer only contends with others hitting the same shard.
//!
//! ```text
//! shard = id mod shard_count
//!
//! [Mutex<map>] [Mutex<map>] [Mutex<map>] ... [Mutex<map>]
//!      0            1            2              n - 1
//! ```
//!
//! Accumulation order is unspecified. Callers must join all writers before
//! calling [`ShardedAccumulator::merge`].

use std::collections::BTreeMap;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use sift_types::DocId;

/// Per-document running totals behind `shard_count` locks.
#[derive(Debug)]
pub struct ShardedAccumulator {
    shards: Box<[Mutex<FxHashMap<DocId, f64>>]>,
}

impl ShardedAccumulator {
    /// Creates an accumulator with `shard_count` shards (at least one).
    pub fn new(shard_count: usize) -> Self {
        let shards = (0..shard_count.max(1))
            .map(|_| Mutex::new(FxHashMap::default()))
            .collect();
        Self { shards }
    }

    /// Number of shards.
    #[inline(always)]
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    #[inline(always)]
    fn shard_of(&self, id: DocId) -> &Mutex<FxHashMap<DocId, f64>> {
        let index = i64::from(id).rem_euclid(self.shards.len() as i64) as usize;
        &self.shards[index]
    }

    /// Adds `delta` to the total for `id`, starting from zero if absent.
    #[inline]
    pub fn add_to(&self, id: DocId, delta: f64) {
        *self.shard_of(id).lock().entry(id).or_insert(0.0) += delta;
    }

    /// Drains every shard into one ordered map.
    ///
    /// The accumulator is empty afterwards and can be reused.
    pub fn merge(&self) -> BTreeMap<DocId, f64> {
        let mut merged = BTreeMap::new();
        for shard in self.shards.iter() {
            merged.extend(shard.lock().drain());
        }
        merged
    }
}
