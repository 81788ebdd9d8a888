//! Document and label types for sentiment classification.
//!
//! A [`Document`] is the immutable unit the pipeline consumes: an id, the
//! raw sentence text, and a [`Label`] drawn from a fixed three-class set.
//! Loading, deduplication, and recovery from malformed rows are the data
//! loader's responsibility; every document handed to this crate already
//! carries a label.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Sentiment class of a document.
///
/// The variant order is the fixed label order used everywhere labels are
/// indexed: coefficient rows, probability vectors, and confusion-matrix
/// rows/columns all follow [`Label::ALL`].
///
/// # Examples
///
/// ```
/// use tonality::document::Label;
///
/// assert_eq!(Label::ALL.len(), 3);
/// assert_eq!(Label::Positive.index(), 0);
/// assert_eq!(Label::from_index(2), Some(Label::Neutral));
/// assert_eq!(Label::Negative.to_string(), "Negative");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Label {
    /// Positive sentiment.
    Positive,
    /// Negative sentiment.
    Negative,
    /// Neutral sentiment.
    Neutral,
}

impl Label {
    /// All labels in the fixed label order.
    pub const ALL: [Label; 3] = [Label::Positive, Label::Negative, Label::Neutral];

    /// Number of labels.
    pub const COUNT: usize = 3;

    /// Dense index of this label in the fixed label order.
    pub fn index(&self) -> usize {
        match self {
            Label::Positive => 0,
            Label::Negative => 1,
            Label::Neutral => 2,
        }
    }

    /// Label at the given dense index, if in range.
    pub fn from_index(index: usize) -> Option<Label> {
        Label::ALL.get(index).copied()
    }

    /// Human-readable label name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Positive => "Positive",
            Label::Negative => "Negative",
            Label::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A labeled sentence.
///
/// Documents are created once at load time and never mutated by the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Stable identifier assigned by the loader.
    pub id: u64,
    /// Raw sentence text.
    pub text: String,
    /// Sentiment label. Never missing: unlabeled rows are rejected upstream.
    pub label: Label,
}

impl Document {
    /// Create a new document.
    pub fn new<S: Into<String>>(id: u64, text: S, label: Label) -> Self {
        Document {
            id,
            text: text.into(),
            label,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_order_is_stable() {
        for (i, label) in Label::ALL.iter().enumerate() {
            assert_eq!(label.index(), i);
            assert_eq!(Label::from_index(i), Some(*label));
        }
        assert_eq!(Label::from_index(3), None);
    }

    #[test]
    fn test_document_construction() {
        let doc = Document::new(7, "The movie was great.", Label::Positive);
        assert_eq!(doc.id, 7);
        assert_eq!(doc.text, "The movie was great.");
        assert_eq!(doc.label, Label::Positive);
    }

    #[test]
    fn test_label_serde_round_trip() {
        let json = serde_json::to_string(&Label::Neutral).unwrap();
        let back: Label = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Label::Neutral);
    }
}
