//! Bounded vocabulary construction from a training partition.
//!
//! The builder counts document frequency (the number of training documents
//! a token appears in, not raw occurrences) and keeps the `max_tokens`
//! highest-frequency tokens. Ties are broken by lexical order so the
//! selection is deterministic. Once built, a [`Vocabulary`] is frozen:
//! out-of-vocabulary tokens seen later map to "absent" and never extend it.

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TonalityError};

/// A frozen token → dense index mapping plus the training-partition
/// document frequencies it was built from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vocabulary {
    /// Terms in index order (descending document frequency, ties lexical).
    terms: Vec<String>,
    /// Token → index lookup.
    index: AHashMap<String, usize>,
    /// Document frequency per term, aligned with `terms`.
    doc_frequency: Vec<usize>,
    /// Number of training documents the vocabulary was built from.
    n_documents: usize,
}

impl Vocabulary {
    /// Look up the dense index of a token, if present.
    pub fn get(&self, token: &str) -> Option<usize> {
        self.index.get(token).copied()
    }

    /// Term at the given index.
    pub fn term(&self, index: usize) -> Option<&str> {
        self.terms.get(index).map(String::as_str)
    }

    /// Terms in index order.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Document frequency of the term at the given index.
    pub fn doc_frequency(&self, index: usize) -> Option<usize> {
        self.doc_frequency.get(index).copied()
    }

    /// Number of training documents the vocabulary was built from.
    pub fn n_documents(&self) -> usize {
        self.n_documents
    }

    /// Number of terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether the vocabulary has no terms.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Builds a [`Vocabulary`] from tokenized training documents.
#[derive(Debug, Clone)]
pub struct VocabularyBuilder {
    max_tokens: usize,
}

impl VocabularyBuilder {
    /// Create a builder with the given cardinality cap.
    pub fn new(max_tokens: usize) -> Self {
        VocabularyBuilder { max_tokens }
    }

    /// Count document frequencies across the training partition and select
    /// the top `max_tokens` tokens.
    ///
    /// Accepts any slice of token lists, owned or borrowed, so fold slices
    /// can be passed without copying.
    ///
    /// # Errors
    ///
    /// Returns [`TonalityError::VocabularyEmpty`] if zero tokens survive
    /// filtering across the whole partition.
    pub fn build<D: AsRef<[String]>>(&self, documents: &[D]) -> Result<Vocabulary> {
        let mut document_frequency: AHashMap<&str, usize> = AHashMap::new();
        for tokens in documents {
            let unique: AHashSet<&str> = tokens.as_ref().iter().map(String::as_str).collect();
            for token in unique {
                *document_frequency.entry(token).or_insert(0) += 1;
            }
        }

        if document_frequency.is_empty() {
            return Err(TonalityError::vocabulary_empty(
                "no tokens survived filtering across the training partition",
            ));
        }

        let mut ranked: Vec<(&str, usize)> = document_frequency.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(self.max_tokens);

        let terms: Vec<String> = ranked.iter().map(|(t, _)| t.to_string()).collect();
        let doc_frequency: Vec<usize> = ranked.iter().map(|(_, df)| *df).collect();
        let index = terms
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();

        Ok(Vocabulary {
            terms,
            index,
            doc_frequency,
            n_documents: documents.len(),
        })
    }
}
