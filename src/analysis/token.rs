//! Token types for text analysis.
//!
//! A [`Token`] is the unit that flows out of tokenization: a normalized
//! word, or an n-gram of consecutive normalized words joined by a single
//! space.
//!
//! # Examples
//!
//! ```
//! use tonality::analysis::token::Token;
//!
//! let token = Token::new("great", 3);
//! assert_eq!(token.text, "great");
//! assert_eq!(token.position, 3);
//! ```

use serde::{Deserialize, Serialize};

/// A single unit of text after tokenization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The token's text content.
    pub text: String,
    /// Zero-based position of the token's first word in the source text.
    pub position: usize,
}

impl Token {
    /// Create a new token.
    pub fn new<S: Into<String>>(text: S, position: usize) -> Self {
        Token {
            text: text.into(),
            position,
        }
    }
}

/// A boxed iterator of tokens produced by a tokenizer.
///
/// The sequence is finite; calling `tokenize` again on the same text
/// restarts it from the beginning.
pub type TokenStream = Box<dyn Iterator<Item = Token> + Send>;
