//! Tokenizer implementations for sentence analysis.
//!
//! Tokenization turns raw text into the ordered token sequence the feature
//! extractor consumes. Words are normalized (lowercased, surrounding
//! punctuation stripped), optionally filtered, and then emitted either as
//! single words or as sliding n-gram windows joined by a single space.
//!
//! # Examples
//!
//! ```
//! use tonality::analysis::tokenizer::{Tokenizer, WordGramTokenizer};
//!
//! let tokenizer = WordGramTokenizer::unigram();
//! let tokens: Vec<String> = tokenizer
//!     .tokenize("The movie was great.")
//!     .unwrap()
//!     .map(|t| t.text)
//!     .collect();
//! assert_eq!(tokens, vec!["the", "movie", "was", "great"]);
//!
//! let bigrams = WordGramTokenizer::new(2, 2).unwrap();
//! let tokens: Vec<String> = bigrams
//!     .tokenize("The movie was great.")
//!     .unwrap()
//!     .map(|t| t.text)
//!     .collect();
//! assert_eq!(tokens, vec!["the movie", "movie was", "was great"]);
//! ```

use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

use crate::analysis::stop::StopWords;
use crate::analysis::token::{Token, TokenStream};
use crate::error::{Result, TonalityError};

/// Trait for tokenizers that convert text into tokens.
///
/// The trait requires `Send + Sync` to allow use across the grid-search
/// worker threads.
pub trait Tokenizer: Send + Sync {
    /// Tokenize the given text into a stream of tokens.
    fn tokenize(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this tokenizer (for debugging and configuration).
    fn name(&self) -> &'static str;

    /// Collect the token texts for the given input.
    ///
    /// Convenience for callers that only need the surface forms.
    fn token_texts(&self, text: &str) -> Result<Vec<String>> {
        Ok(self.tokenize(text)?.map(|t| t.text).collect())
    }
}

/// A tokenizer that emits normalized word n-grams.
///
/// Configuration mirrors the core's tokenization surface:
///
/// - `gram_size`: window size `n`; windows are `n` consecutive normalized
///   words joined by a single space.
/// - `min_gram_size`: when smaller than `gram_size`, windows of every size
///   from `min_gram_size` to `gram_size` are produced (mixed-order mode).
/// - `strip_numeric`: drop purely numeric words before windowing.
/// - `stop_words`: drop unigram *output* tokens whose surface form is a
///   member. Multi-word windows are not filtered unless `filter_gram_parts`
///   is set, in which case stop words are removed from the word stream
///   before windowing.
///
/// A text shorter than a window size yields zero windows of that size.
#[derive(Debug, Clone)]
pub struct WordGramTokenizer {
    gram_size: usize,
    min_gram_size: usize,
    strip_numeric: bool,
    filter_gram_parts: bool,
    stop_words: StopWords,
    numeric: Regex,
}

/// Matches tokens that are entirely numeric, allowing `.`/`,` group and
/// decimal separators (e.g. `42`, `3.5`, `1,200`).
const NUMERIC_PATTERN: &str = r"^[0-9]+([.,][0-9]+)*$";

impl WordGramTokenizer {
    /// Create a new word n-gram tokenizer.
    ///
    /// # Errors
    ///
    /// Returns an error if `min_gram_size` is 0 or greater than `gram_size`.
    pub fn new(min_gram_size: usize, gram_size: usize) -> Result<Self> {
        if min_gram_size == 0 {
            return Err(TonalityError::analysis("min_gram_size must be at least 1"));
        }
        if gram_size < min_gram_size {
            return Err(TonalityError::analysis(format!(
                "gram_size ({gram_size}) must be >= min_gram_size ({min_gram_size})"
            )));
        }
        Ok(WordGramTokenizer {
            gram_size,
            min_gram_size,
            strip_numeric: false,
            filter_gram_parts: false,
            stop_words: StopWords::none(),
            numeric: Regex::new(NUMERIC_PATTERN).expect("numeric pattern is valid"),
        })
    }

    /// Create a unigram tokenizer (n = 1).
    pub fn unigram() -> Self {
        Self::new(1, 1).expect("unigram bounds are valid")
    }

    /// Create a bigram tokenizer (n = 2).
    pub fn bigram() -> Self {
        Self::new(2, 2).expect("bigram bounds are valid")
    }

    /// Drop purely numeric words before windowing.
    pub fn with_strip_numeric(mut self, strip: bool) -> Self {
        self.strip_numeric = strip;
        self
    }

    /// Set the stop word set.
    pub fn with_stop_words(mut self, stop_words: StopWords) -> Self {
        self.stop_words = stop_words;
        self
    }

    /// Remove stop words from the word stream before windowing, so that
    /// multi-word grams never contain a stop word.
    pub fn with_filter_gram_parts(mut self, filter: bool) -> Self {
        self.filter_gram_parts = filter;
        self
    }

    /// Normalize one raw word: lowercase, strip surrounding punctuation.
    ///
    /// Returns `None` when nothing is left after stripping.
    fn normalize(word: &str) -> Option<String> {
        let trimmed = word.trim_matches(|c: char| !c.is_alphanumeric());
        if trimmed.is_empty() {
            return None;
        }
        Some(trimmed.to_lowercase())
    }

    /// Split and normalize the input into the word stream windows are
    /// built from.
    fn normalized_words(&self, text: &str) -> Vec<String> {
        text.unicode_words()
            .filter_map(Self::normalize)
            .filter(|w| !(self.strip_numeric && self.numeric.is_match(w)))
            .filter(|w| {
                !(self.filter_gram_parts
                    && !self.stop_words.is_empty()
                    && self.stop_words.contains(w))
            })
            .collect()
    }
}

impl Tokenizer for WordGramTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        let words = self.normalized_words(text);

        let mut tokens = Vec::new();
        for start in 0..words.len() {
            for size in self.min_gram_size..=self.gram_size {
                let end = start + size;
                if end > words.len() {
                    break;
                }
                // Unigram outputs are subject to stop word removal;
                // multi-word windows pass through untouched.
                if size == 1
                    && !self.filter_gram_parts
                    && !self.stop_words.is_empty()
                    && self.stop_words.contains(&words[start])
                {
                    continue;
                }
                tokens.push(Token::new(words[start..end].join(" "), start));
            }
        }

        Ok(Box::new(tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "word_gram"
    }
}
