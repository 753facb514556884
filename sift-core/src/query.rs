//! Query parsing.
//!
//! A raw query is a space-separated list of words. A word with a single
//! leading `-` is a minus word: any document containing it is dropped from
//! the results. Every other word is a plus word and contributes relevance.
//! Stop words are discarded from both lists.
//!
//! Two structured forms exist:
//!
//! - [`Query`]: sets, used by the sequential scorer.
//! - [`ParallelQuery`]: sorted, duplicate-free vectors that the parallel
//!   scorer can split across worker threads.
//!
//! Parsed words borrow from the query text.

use std::collections::BTreeSet;

use rayon::slice::ParallelSliceMut;
use rustc_hash::FxHashSet;
use sift_types::{Result, SearchError};

use crate::analyzer::tokenizer::{is_valid_word, strip_minus, Tokenizer};

/// Words excluded from indexing and querying. Fixed at engine construction.
#[derive(Debug, Clone, Default)]
pub struct StopWords {
    words: FxHashSet<Box<str>>,
}

impl StopWords {
    /// Builds the set, dropping empty strings and duplicates.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::InvalidWord` if a stop word contains a control character.
    pub fn new<I, S>(words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = FxHashSet::default();
        for word in words {
            let word = word.as_ref();
            if word.is_empty() {
                continue;
            }
            if !is_valid_word(word) {
                return Err(SearchError::InvalidWord {
                    word: word.to_owned(),
                });
            }
            set.insert(Box::from(word));
        }
        Ok(Self { words: set })
    }

    /// Builds the set from space-separated text.
    ///
    /// # Errors
    ///
    /// Same as [`StopWords::new`].
    pub fn from_text(text: &str) -> Result<Self> {
        let mut words = Vec::new();
        Tokenizer::new().tokenize(text, |word, _| words.push(word));
        Self::new(words)
    }

    /// Returns `true` if `word` is a stop word.
    #[inline]
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    /// Number of distinct stop words.
    #[inline]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Returns `true` if there are no stop words.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// One classified query token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryWord<'q> {
    /// The word with any leading `-` removed.
    pub text: &'q str,
    /// The token started with `-`.
    pub is_minus: bool,
    /// The word is a stop word and will be ignored.
    pub is_stop: bool,
}

/// Classifies a single query token.
///
/// # Errors
///
/// - `SearchError::InvalidQuery` for an empty token, a bare `-`, or a token
///   starting with `--`.
/// - `SearchError::InvalidWord` if the token contains a control character.
pub fn parse_query_word<'q>(token: &'q str, stop_words: &StopWords) -> Result<QueryWord<'q>> {
    if token.is_empty() {
        return Err(invalid_query(token, "empty word"));
    }

    let (text, is_minus) = strip_minus(token);
    if text.is_empty() {
        return Err(invalid_query(token, "minus sign without a word"));
    }
    if text.starts_with('-') {
        return Err(invalid_query(token, "more than one leading minus"));
    }
    if !is_valid_word(text) {
        return Err(SearchError::InvalidWord {
            word: token.to_owned(),
        });
    }

    Ok(QueryWord {
        text,
        is_minus,
        is_stop: stop_words.contains(text),
    })
}

fn invalid_query(token: &str, reason: &'static str) -> SearchError {
    SearchError::InvalidQuery {
        token: token.to_owned(),
        reason,
    }
}

/// Calls `emit` for every non-stop word of `text`, stopping at the first error.
fn for_each_query_word<'q>(
    text: &'q str,
    stop_words: &StopWords,
    mut emit: impl FnMut(QueryWord<'q>),
) -> Result<()> {
    let mut failure = None;
    Tokenizer::new().tokenize(text, |token, _| {
        if failure.is_some() {
            return;
        }
        match parse_query_word(token, stop_words) {
            Ok(word) if !word.is_stop => emit(word),
            Ok(_) => {}
            Err(err) => failure = Some(err),
        }
    });
    failure.map_or(Ok(()), Err)
}

/// Set-based query for the sequential scorer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query<'q> {
    /// Words that contribute relevance.
    pub plus_words: BTreeSet<&'q str>,
    /// Words that disqualify a document.
    pub minus_words: BTreeSet<&'q str>,
}

impl<'q> Query<'q> {
    /// Parses `text`.
    ///
    /// # Errors
    ///
    /// See [`parse_query_word`].
    pub fn parse(text: &'q str, stop_words: &StopWords) -> Result<Self> {
        let mut query = Self::default();
        for_each_query_word(text, stop_words, |word| {
            if word.is_minus {
                query.minus_words.insert(word.text);
            } else {
                query.plus_words.insert(word.text);
            }
        })?;
        Ok(query)
    }
}

/// Sorted, duplicate-free query for the parallel scorer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParallelQuery<'q> {
    /// Words that contribute relevance, sorted and unique.
    pub plus_words: Vec<&'q str>,
    /// Words that disqualify a document, sorted and unique.
    pub minus_words: Vec<&'q str>,
}

impl<'q> ParallelQuery<'q> {
    /// Parses `text`.
    ///
    /// # Errors
    ///
    /// See [`parse_query_word`].
    pub fn parse(text: &'q str, stop_words: &StopWords) -> Result<Self> {
        let mut query = Self::default();
        for_each_query_word(text, stop_words, |word| {
            if word.is_minus {
                query.minus_words.push(word.text);
            } else {
                query.plus_words.push(word.text);
            }
        })?;

        for words in [&mut query.plus_words, &mut query.minus_words] {
            words.par_sort_unstable();
            words.dedup();
        }
        Ok(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(words: &[&str]) -> StopWords {
        StopWords::new(words.iter().copied()).expect("valid stop words")
    }

    #[test]
    fn classify_plus_and_minus() {
        let stop_words = stop(&["and"]);
        let word = parse_query_word("cat", &stop_words).expect("valid");
        assert_eq!(
            word,
            QueryWord {
                text: "cat",
                is_minus: false,
                is_stop: false
            }
        );

        let word = parse_query_word("-cat", &stop_words).expect("valid");
        assert!(word.is_minus);
        assert_eq!(word.text, "cat");

        assert!(parse_query_word("and", &stop_words).expect("valid").is_stop);
        assert!(parse_query_word("-and", &stop_words).expect("valid").is_stop);
    }

    #[test]
    fn reject_malformed_tokens() {
        let stop_words = StopWords::default();
        for token in ["", "-", "--cat", "---"] {
            assert!(
                matches!(
                    parse_query_word(token, &stop_words),
                    Err(SearchError::InvalidQuery { .. })
                ),
                "{token:?} should be rejected"
            );
        }
        assert!(matches!(
            parse_query_word("c\x02at", &stop_words),
            Err(SearchError::InvalidWord { .. })
        ));
        assert!(parse_query_word("well-groomed", &stop_words).is_ok());
    }

    #[test]
    fn sequential_parse_deduplicates_and_drops_stop_words() {
        let stop_words = stop(&["in", "the"]);
        let query = Query::parse("cat in the city -dog cat -dog", &stop_words).expect("valid");
        assert_eq!(query.plus_words.into_iter().collect::<Vec<_>>(), ["cat", "city"]);
        assert_eq!(query.minus_words.into_iter().collect::<Vec<_>>(), ["dog"]);
    }

    #[test]
    fn parallel_parse_is_sorted_and_unique() {
        let stop_words = stop(&["in"]);
        let query =
            ParallelQuery::parse("zebra cat in cat apple -x -b -x", &stop_words).expect("valid");
        assert_eq!(query.plus_words, ["apple", "cat", "zebra"]);
        assert_eq!(query.minus_words, ["b", "x"]);
    }

    #[test]
    fn both_forms_agree() {
        let stop_words = stop(&["and", "the"]);
        let text = "the fluffy and -collar cat fluffy well-groomed -collar -the";
        let sequential = Query::parse(text, &stop_words).expect("valid");
        let parallel = ParallelQuery::parse(text, &stop_words).expect("valid");

        assert_eq!(
            sequential.plus_words.iter().copied().collect::<Vec<_>>(),
            parallel.plus_words
        );
        assert_eq!(
            sequential.minus_words.iter().copied().collect::<Vec<_>>(),
            parallel.minus_words
        );
    }

    #[test]
    fn parse_error_fails_whole_query() {
        let stop_words = StopWords::default();
        assert!(Query::parse("cat -- dog", &stop_words).is_err());
        assert!(ParallelQuery::parse("cat dog -", &stop_words).is_err());
    }

    #[test]
    fn empty_query() {
        let query = Query::parse("   ", &StopWords::default()).expect("valid");
        assert!(query.plus_words.is_empty());
        assert!(query.minus_words.is_empty());
    }

    #[test]
    fn stop_words_from_text() {
        let stop_words = StopWords::from_text("in  the in ").expect("valid");
        assert_eq!(stop_words.len(), 2);
        assert!(stop_words.contains("in"));
        assert!(!stop_words.contains(""));
        assert!(StopWords::from_text("bad\x03word").is_err());
        assert!(StopWords::new(["", ""]).expect("valid").is_empty());
    }
}
