//! Feature extraction: vocabulary selection and TF-IDF weighting.
//!
//! Both stages follow a strict fit/transform split: `fit` learns frozen
//! parameters from a training partition only, and `transform` is a pure
//! function of those frozen parameters and one document. Validation and
//! test documents are transformed with the training-partition statistics,
//! never refit, so no information leaks across partitions.

pub mod tfidf;
pub mod vocabulary;

pub use tfidf::{DocumentTermMatrix, SparseVector, TfIdfVectorizer};
pub use vocabulary::{Vocabulary, VocabularyBuilder};
