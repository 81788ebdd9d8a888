//! Stop word sets.
//!
//! Stop words are common words that carry little sentiment signal on their
//! own. The set is consumed read-only by the tokenizer; an empty set (the
//! default) disables stop word filtering entirely.
//!
//! # Examples
//!
//! ```
//! use tonality::analysis::stop::StopWords;
//!
//! let stop = StopWords::english();
//! assert!(stop.contains("the"));
//! assert!(!stop.contains("movie"));
//!
//! let custom = StopWords::custom(["foo", "bar"]);
//! assert!(custom.contains("bar"));
//! ```

use std::sync::LazyLock;

use ahash::AHashSet;

/// Default English stop words list.
///
/// Common English words that are typically filtered out before feature
/// extraction.
const DEFAULT_ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into", "is", "it",
    "no", "not", "of", "on", "or", "such", "that", "the", "their", "then", "there", "these",
    "they", "this", "to", "was", "will", "with",
];

static ENGLISH: LazyLock<AHashSet<String>> = LazyLock::new(|| {
    DEFAULT_ENGLISH_STOP_WORDS
        .iter()
        .map(|w| w.to_string())
        .collect()
});

/// A read-only set of stop words.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopWords {
    words: AHashSet<String>,
}

impl StopWords {
    /// Create an empty set (no filtering).
    pub fn none() -> Self {
        StopWords::default()
    }

    /// Create a set with the default English stop words.
    pub fn english() -> Self {
        StopWords {
            words: ENGLISH.clone(),
        }
    }

    /// Create a set from custom words. Words are lowercased so membership
    /// tests line up with normalized tokens.
    pub fn custom<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        StopWords {
            words: words
                .into_iter()
                .map(|w| w.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Check whether a word is a member of the set.
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    /// Whether the set is empty (filtering disabled).
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Number of words in the set.
    pub fn len(&self) -> usize {
        self.words.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_empty() {
        let stop = StopWords::none();
        assert!(stop.is_empty());
        assert!(!stop.contains("the"));
    }

    #[test]
    fn test_english_set() {
        let stop = StopWords::english();
        assert!(!stop.is_empty());
        assert!(stop.contains("the"));
        assert!(stop.contains("was"));
        assert!(!stop.contains("great"));
    }

    #[test]
    fn test_custom_lowercases() {
        let stop = StopWords::custom(["Movie", "FILM"]);
        assert_eq!(stop.len(), 2);
        assert!(stop.contains("movie"));
        assert!(stop.contains("film"));
    }
}
