//! TF-IDF feature extraction over a frozen vocabulary.
//!
//! Term frequency is occurrence count divided by the document's total token
//! count; inverse document frequency is `ln(N / df)` with both `N` and `df`
//! taken from the training partition at fit time. A term present in every
//! training document therefore has `idf = 0` and weighs zero everywhere,
//! which is expected, not a defect. `transform` is a pure function of the fitted
//! state and one document and is applied identically to validation and test
//! documents without refitting.
//!
//! # Examples
//!
//! ```
//! use tonality::features::{TfIdfVectorizer, VocabularyBuilder};
//!
//! let train: Vec<Vec<String>> = [["cat", "cat", "dog"], ["dog", "dog", "fish"]]
//!     .iter()
//!     .map(|d| d.iter().map(|s| s.to_string()).collect())
//!     .collect();
//!
//! let vectorizer = TfIdfVectorizer::fit(&train, &VocabularyBuilder::new(100)).unwrap();
//! let row = vectorizer.transform(&train[0]);
//!
//! let cat = vectorizer.vocabulary().get("cat").unwrap();
//! let expected = (2.0 / 3.0) * (2.0f64).ln();
//! assert!((row.get(cat) - expected).abs() < 1e-12);
//!
//! // "dog" appears in every training document, so it weighs zero.
//! let dog = vectorizer.vocabulary().get("dog").unwrap();
//! assert_eq!(row.get(dog), 0.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::features::vocabulary::{Vocabulary, VocabularyBuilder};

/// A sparse feature vector: `(index, weight)` pairs sorted by index, zero
/// weights omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    /// Build from entries; sorts by index and drops zero weights.
    pub fn from_entries(mut entries: Vec<(usize, f64)>) -> Self {
        entries.retain(|(_, w)| *w != 0.0);
        entries.sort_by_key(|(i, _)| *i);
        SparseVector { entries }
    }

    /// Weight at the given feature index (0.0 when absent).
    pub fn get(&self, index: usize) -> f64 {
        self.entries
            .binary_search_by_key(&index, |(i, _)| *i)
            .map(|pos| self.entries[pos].1)
            .unwrap_or(0.0)
    }

    /// Iterate over the nonzero `(index, weight)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.entries.iter().copied()
    }

    /// Number of nonzero entries.
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    /// Dot product with a dense weight row.
    pub fn dot(&self, dense: &[f64]) -> f64 {
        self.entries
            .iter()
            .map(|(i, w)| w * dense.get(*i).copied().unwrap_or(0.0))
            .sum()
    }
}

/// Rows of TF-IDF features for one partition.
///
/// Built independently wherever a vocabulary is fit (per fold, and once for
/// the final full-train fit) and never shared across partitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentTermMatrix {
    rows: Vec<SparseVector>,
    n_features: usize,
}

impl DocumentTermMatrix {
    /// Row for the document at the given position.
    pub fn row(&self, index: usize) -> &SparseVector {
        &self.rows[index]
    }

    /// All rows in document order.
    pub fn rows(&self) -> &[SparseVector] {
        &self.rows
    }

    /// Number of documents.
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of vocabulary terms (columns).
    pub fn n_features(&self) -> usize {
        self.n_features
    }
}

/// TF-IDF vectorizer with a frozen vocabulary and idf table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfIdfVectorizer {
    vocabulary: Vocabulary,
    idf: Vec<f64>,
}

impl TfIdfVectorizer {
    /// Fit the vectorizer on tokenized training documents.
    ///
    /// Builds the vocabulary with `builder` and computes the idf table from
    /// the same partition.
    pub fn fit<D: AsRef<[String]>>(documents: &[D], builder: &VocabularyBuilder) -> Result<Self> {
        let vocabulary = builder.build(documents)?;
        let n = vocabulary.n_documents() as f64;

        let idf = (0..vocabulary.len())
            .map(|i| {
                let df = vocabulary
                    .doc_frequency(i)
                    .expect("idf table aligned with vocabulary") as f64;
                (n / df).ln()
            })
            .collect();

        Ok(TfIdfVectorizer { vocabulary, idf })
    }

    /// Transform one tokenized document into a sparse TF-IDF vector.
    ///
    /// Pure function of the fitted state: out-of-vocabulary tokens
    /// contribute nothing, and the idf table is never updated.
    pub fn transform(&self, tokens: &[String]) -> SparseVector {
        let total = tokens.len() as f64;
        if total == 0.0 {
            return SparseVector::default();
        }

        let mut counts: ahash::AHashMap<usize, usize> = ahash::AHashMap::new();
        for token in tokens {
            if let Some(index) = self.vocabulary.get(token) {
                *counts.entry(index).or_insert(0) += 1;
            }
        }

        SparseVector::from_entries(
            counts
                .into_iter()
                .map(|(index, count)| (index, (count as f64 / total) * self.idf[index]))
                .collect(),
        )
    }

    /// Transform a whole partition into a document-term matrix.
    pub fn transform_all<D: AsRef<[String]>>(&self, documents: &[D]) -> DocumentTermMatrix {
        DocumentTermMatrix {
            rows: documents
                .iter()
                .map(|d| self.transform(d.as_ref()))
                .collect(),
            n_features: self.vocabulary.len(),
        }
    }

    /// The frozen vocabulary.
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// The fitted idf table, aligned with vocabulary indices.
    pub fn idf(&self) -> &[f64] {
        &self.idf
    }
}
