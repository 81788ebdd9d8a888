//! Majority-class null baseline.
//!
//! The lower performance bar for every tuned model: predict the training
//! partition's majority label for every input, ignoring features entirely.
//! Its training accuracy equals the majority class's proportion exactly.

use serde::{Deserialize, Serialize};

use crate::document::Label;
use crate::error::{Result, TonalityError};

/// A classifier that always predicts the training majority label.
///
/// # Examples
///
/// ```
/// use tonality::document::Label;
/// use tonality::model::baseline::MajorityBaseline;
///
/// let labels = [
///     Label::Positive, Label::Positive, Label::Positive,
///     Label::Negative, Label::Neutral,
/// ];
/// let baseline = MajorityBaseline::fit(&labels).unwrap();
/// assert_eq!(baseline.predict(), Label::Positive);
/// assert_eq!(baseline.training_accuracy(), 3.0 / 5.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MajorityBaseline {
    label: Label,
    proportion: f64,
}

impl MajorityBaseline {
    /// Fit on training labels.
    ///
    /// Ties between classes resolve to the earlier label in the fixed label
    /// order.
    pub fn fit(labels: &[Label]) -> Result<Self> {
        if labels.is_empty() {
            return Err(TonalityError::model(
                "cannot fit a baseline with zero samples",
            ));
        }

        let mut counts = [0usize; Label::COUNT];
        for label in labels {
            counts[label.index()] += 1;
        }

        let mut best = 0;
        for c in 1..Label::COUNT {
            if counts[c] > counts[best] {
                best = c;
            }
        }

        Ok(MajorityBaseline {
            label: Label::ALL[best],
            proportion: counts[best] as f64 / labels.len() as f64,
        })
    }

    /// The majority label, predicted for every input.
    pub fn predict(&self) -> Label {
        self.label
    }

    /// Training accuracy: the majority class's proportion, exactly.
    pub fn training_accuracy(&self) -> f64 {
        self.proportion
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy_equals_majority_proportion_exactly() {
        // 120 of 200 positive => null accuracy 0.60.
        let mut labels = vec![Label::Positive; 120];
        labels.extend(vec![Label::Negative; 50]);
        labels.extend(vec![Label::Neutral; 30]);

        let baseline = MajorityBaseline::fit(&labels).unwrap();
        assert_eq!(baseline.predict(), Label::Positive);
        assert_eq!(baseline.training_accuracy(), 0.60);
    }

    #[test]
    fn test_ties_resolve_in_label_order() {
        let labels = [Label::Neutral, Label::Negative];
        let baseline = MajorityBaseline::fit(&labels).unwrap();
        assert_eq!(baseline.predict(), Label::Negative);
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(MajorityBaseline::fit(&[]).is_err());
    }
}
