//! Text analysis pipeline: tokens, tokenizers, and stop word handling.
//!
//! Analysis turns a raw sentence into the ordered token sequence the
//! feature extractor consumes. The pipeline has one stage with a trait
//! seam ([`tokenizer::Tokenizer`]) so callers can swap tokenization
//! strategies without touching the rest of the core.

pub mod stop;
pub mod token;
pub mod tokenizer;

pub use stop::StopWords;
pub use token::{Token, TokenStream};
pub use tokenizer::{Tokenizer, WordGramTokenizer};
