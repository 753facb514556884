//! Append-only Word Storage
//!
//! Every indexed word is copied once into a single growing buffer and
//! referenced everywhere else by a small handle. Handles are positions, not
//! addresses, so they stay valid however often the buffer reallocates.
//!
//! ## Memory Layout
//!
//! ```text
//! Arena Buffer: [white][cat][fancy][collar]...[free space]
//!               ^      ^    ^      ^
//!               |      |    |      |
//! Spans:       (0,5)  (5,3)(8,5)  (13,6) ...
//! ```
//!
//! Two layers live here:
//!
//! - [`WordArena`]: raw storage. `push` always appends, so pushing the same
//!   text twice yields two distinct spans.
//! - [`Lexicon`]: the dedup layer the engine uses. Identical text maps to a
//!   single [`WordId`], which keeps the inverted index free of duplicate keys.

use core::hash::BuildHasher;

use rustc_hash::{FxBuildHasher, FxHashMap};
use sift_types::{Result, SearchError};
use smallvec::SmallVec;

/// Location of one word inside a [`WordArena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WordSpan {
    offset: usize,
    len: usize,
}

impl WordSpan {
    /// Returns the byte offset in the arena.
    #[inline(always)]
    pub const fn offset(self) -> usize {
        self.offset
    }

    /// Returns the byte length.
    #[inline(always)]
    pub const fn len(self) -> usize {
        self.len
    }

    /// Returns true for the span of an empty word.
    #[inline(always)]
    pub const fn is_empty(self) -> bool {
        self.len == 0
    }
}

/// Bump storage for word text.
#[derive(Debug)]
pub struct WordArena {
    buffer: String,
    words: usize,
}

impl Default for WordArena {
    fn default() -> Self {
        Self::new()
    }
}

impl WordArena {
    /// Creates a new empty arena.
    pub fn new() -> Self {
        Self::with_capacity(16 * 1024)
    }

    /// Creates a new arena with `bytes` of pre-allocated text capacity.
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            buffer: String::with_capacity(bytes),
            words: 0,
        }
    }

    /// Returns the number of words pushed so far.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.words
    }

    /// Returns true if nothing has been pushed.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.words == 0
    }

    /// Returns the number of text bytes stored.
    #[inline(always)]
    pub fn bytes(&self) -> usize {
        self.buffer.len()
    }

    /// Appends a copy of `word` and returns its span.
    #[inline]
    pub fn push(&mut self, word: &str) -> WordSpan {
        let offset = self.buffer.len();
        self.buffer.push_str(word);
        self.words += 1;
        WordSpan {
            offset,
            len: word.len(),
        }
    }

    /// Returns the text behind `span`.
    ///
    /// `None` only for spans that were not issued by this arena.
    #[inline(always)]
    pub fn get(&self, span: WordSpan) -> Option<&str> {
        self.buffer.get(span.offset..span.offset + span.len)
    }
}

/// Dense identifier of a distinct word in a [`Lexicon`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct WordId(u32);

impl WordId {
    /// Returns the underlying index.
    #[inline(always)]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Deduplicating word table on top of a [`WordArena`].
///
/// Words are looked up by their Fx hash; each hash bucket holds the ids whose
/// text shares it, and collisions are resolved by comparing arena text.
/// Nothing is ever removed.
///
/// Capacity: ids are `u32`, so at most [`Lexicon::MAX_WORDS`] distinct words.
/// `intern` reports `SearchError::LexiconFull` past the limit.
#[derive(Debug)]
pub struct Lexicon {
    arena: WordArena,
    spans: Vec<WordSpan>,
    buckets: FxHashMap<u64, SmallVec<[WordId; 1]>>,
    max_words: usize,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::new()
    }
}

impl Lexicon {
    /// Largest number of distinct words a lexicon can hold.
    pub const MAX_WORDS: usize = u32::MAX as usize;

    /// Creates an empty lexicon.
    pub fn new() -> Self {
        Self::with_max_words(Self::MAX_WORDS)
    }

    /// Creates an empty lexicon holding at most `max_words` distinct words
    /// (clamped to [`Lexicon::MAX_WORDS`]).
    pub fn with_max_words(max_words: usize) -> Self {
        Self {
            arena: WordArena::new(),
            spans: Vec::new(),
            buckets: FxHashMap::default(),
            max_words: max_words.min(Self::MAX_WORDS),
        }
    }

    /// Maximum number of distinct words.
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.max_words
    }

    /// Number of distinct words that can still be interned.
    #[inline(always)]
    pub fn remaining_capacity(&self) -> usize {
        self.max_words.saturating_sub(self.spans.len())
    }

    /// Number of distinct words.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Returns true if no word has been interned.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// The backing arena.
    #[inline(always)]
    pub fn arena(&self) -> &WordArena {
        &self.arena
    }

    /// Returns the id for `word`, storing it first if it is new.
    ///
    /// # Errors
    ///
    /// `SearchError::LexiconFull` if `word` is new and the lexicon is full.
    pub fn intern(&mut self, word: &str) -> Result<WordId> {
        let hash = FxBuildHasher.hash_one(word);
        if let Some(id) = self.find(hash, word) {
            return Ok(id);
        }

        let full = SearchError::LexiconFull {
            capacity: self.max_words,
        };
        if self.spans.len() >= self.max_words {
            return Err(full);
        }
        let id = WordId(u32::try_from(self.spans.len()).map_err(|_| full)?);
        let span = self.arena.push(word);
        self.spans.push(span);
        self.buckets.entry(hash).or_default().push(id);
        Ok(id)
    }

    /// Returns the id for `word` if it has been interned.
    #[inline]
    pub fn lookup(&self, word: &str) -> Option<WordId> {
        self.find(FxBuildHasher.hash_one(word), word)
    }

    /// Returns the text of `id`.
    ///
    /// Ids from another lexicon may resolve to an arbitrary word or to `""`.
    #[inline]
    pub fn resolve(&self, id: WordId) -> &str {
        self.spans
            .get(id.index())
            .and_then(|&span| self.arena.get(span))
            .unwrap_or_default()
    }

    fn find(&self, hash: u64, word: &str) -> Option<WordId> {
        self.buckets
            .get(&hash)?
            .iter()
            .copied()
            .find(|&id| self.resolve(id) == word)
    }
}
