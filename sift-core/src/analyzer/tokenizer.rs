//! Whitespace Tokenizer
//!
//! Splits raw document and query text into words on the ASCII space byte
//! (0x20). Tokens are slices of the input, so nothing is allocated unless the
//! caller collects them.
//!
//! ```text
//! "white  cat -collar" -> ("white", 0) ("cat", 1) ("-collar", 2)
//! ```
//!
//! Runs of spaces produce no empty tokens. Tabs, newlines and other control
//! bytes are *not* separators: they stay inside the token so that
//! [`is_valid_word`] can reject it.

use core::str;
use memchr::memchr_iter;

/// Streaming tokenizer.
///
/// ## Example
///
/// ```
/// use sift_core::analyzer::tokenizer::Tokenizer;
///
/// let mut words = Vec::new();
/// Tokenizer::new().tokenize("fluffy  cat", |word, _pos| words.push(word));
/// assert_eq!(words, ["fluffy", "cat"]);
/// ```
#[derive(Debug, Copy, Clone, Default)]
pub struct Tokenizer;

impl Tokenizer {
    /// Creates a tokenizer.
    #[inline]
    pub const fn new() -> Self {
        Self
    }

    /// Tokenizes `text` and emits `(word, position)` for each non-empty run.
    ///
    /// Position is `u32`. After emitting a token at position `u32::MAX`,
    /// further emissions stop (overflow protection).
    #[inline(always)]
    pub fn tokenize<'t, F>(&self, text: &'t str, mut emit: F)
    where
        F: FnMut(&'t str, u32),
    {
        let bytes = text.as_bytes();
        if bytes.is_empty() {
            return;
        }

        let mut start = 0usize;
        let mut pos = 0u32;

        for i in memchr_iter(b' ', bytes) {
            if start < i {
                // SAFETY: `text` is valid UTF-8. We split only on ASCII space (0x20),
                // which is never a continuation byte, so `bytes[start..i]` is always a
                // valid UTF-8 subslice.
                let word = unsafe { str::from_utf8_unchecked(&bytes[start..i]) };
                emit(word, pos);
                if pos == u32::MAX {
                    return;
                }
                pos += 1;
            }
            start = i + 1;
        }

        if start < bytes.len() {
            // SAFETY: same invariants as above, `start` follows an ASCII space byte.
            let word = unsafe { str::from_utf8_unchecked(&bytes[start..]) };
            emit(word, pos);
        }
    }
}

/// Collects the words of `text` in order.
pub fn split_into_words(text: &str) -> Vec<&str> {
    let mut words = Vec::new();
    Tokenizer::new().tokenize(text, |word, _| words.push(word));
    words
}

/// Returns `true` if `word` contains no control character (code point below 0x20).
///
/// Multi-byte UTF-8 sequences never contain bytes below 0x80, so a byte scan
/// is enough.
#[inline]
pub fn is_valid_word(word: &str) -> bool {
    !word.bytes().any(|b| b < b' ')
}

/// Strips a single leading `-`, reporting whether one was present.
#[inline]
pub fn strip_minus(token: &str) -> (&str, bool) {
    match token.strip_prefix('-') {
        Some(rest) => (rest, true),
        None => (token, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(input: &str) -> Vec<(&str, u32)> {
        let mut out = Vec::new();
        Tokenizer::new().tokenize(input, |word, pos| out.push((word, pos)));
        out
    }

    #[test]
    fn single_word() {
        let out = collect("hello");
        assert_eq!(out, vec![("hello", 0)]);
    }

    #[test]
    fn positions_are_sequential() {
        let out = collect("the quick brown fox");
        assert_eq!(out.len(), 4);
        for (i, (_, pos)) in out.iter().enumerate() {
            assert_eq!(*pos, i as u32);
        }
    }

    #[test]
    fn empty_emits_nothing() {
        assert!(collect("").is_empty());
        assert!(collect("    ").is_empty());
    }

    #[test]
    fn repeated_and_edge_spaces_are_skipped() {
        assert_eq!(split_into_words("  white   cat  "), vec!["white", "cat"]);
    }

    #[test]
    fn only_space_separates() {
        assert_eq!(split_into_words("a\tb c"), vec!["a\tb", "c"]);
    }

    #[test]
    fn tokens_are_slices_of_input() {
        let input = String::from("hello world");
        let base = input.as_ptr() as usize;
        let end = base + input.len();

        Tokenizer::new().tokenize(&input, |word, _| {
            let ptr = word.as_ptr() as usize;
            assert!(ptr >= base && ptr < end);
        });
    }

    #[test]
    fn multibyte_text() {
        assert_eq!(
            split_into_words("пушистый кот"),
            vec!["пушистый", "кот"]
        );
    }

    #[test]
    fn control_characters_are_invalid() {
        assert!(is_valid_word("cat"));
        assert!(is_valid_word("well-groomed"));
        assert!(is_valid_word("кот"));
        assert!(!is_valid_word("c\x01at"));
        assert!(!is_valid_word("tab\there"));
        assert!(!is_valid_word("\x1f"));
    }

    #[test]
    fn strip_single_minus() {
        assert_eq!(strip_minus("-cat"), ("cat", true));
        assert_eq!(strip_minus("cat"), ("cat", false));
        assert_eq!(strip_minus("--cat"), ("-cat", true));
        assert_eq!(strip_minus("-"), ("", true));
    }
}
