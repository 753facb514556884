//! Text analysis.
//!
//! Sift does no normalization: words are compared byte for byte, exactly as
//! the caller wrote them. This module only splits text and validates words.

pub mod tokenizer;

pub use tokenizer::{is_valid_word, split_into_words, strip_minus, Tokenizer};
