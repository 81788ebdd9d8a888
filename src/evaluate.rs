//! Evaluation metrics: accuracy, per-class sensitivity/specificity,
//! one-vs-rest ROC-AUC, and the confusion matrix.
//!
//! All output types are plain serializable data; rendering and plotting are
//! external consumers' concerns.

use serde::{Deserialize, Serialize};

use crate::document::Label;
use crate::error::{Result, TonalityError};
use crate::model::logistic::Prediction;

/// A 3×3 confusion matrix. Rows are true labels, columns predicted labels,
/// both in [`Label::ALL`] order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    counts: [[usize; Label::COUNT]; Label::COUNT],
}

impl ConfusionMatrix {
    /// Build from aligned true/predicted label slices.
    pub fn from_pairs(y_true: &[Label], y_pred: &[Label]) -> Self {
        let mut counts = [[0usize; Label::COUNT]; Label::COUNT];
        for (t, p) in y_true.iter().zip(y_pred.iter()) {
            counts[t.index()][p.index()] += 1;
        }
        ConfusionMatrix { counts }
    }

    /// Count of documents with true label `t` predicted as `p`.
    pub fn get(&self, t: Label, p: Label) -> usize {
        self.counts[t.index()][p.index()]
    }

    /// The raw count grid.
    pub fn counts(&self) -> &[[usize; Label::COUNT]; Label::COUNT] {
        &self.counts
    }

    /// Total number of documents.
    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    /// Fraction of documents on the diagonal.
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let correct: usize = (0..Label::COUNT).map(|i| self.counts[i][i]).sum();
        correct as f64 / total as f64
    }
}

/// One-vs-rest sensitivity and specificity for one class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassRates {
    /// The class treated as positive.
    pub label: Label,
    /// True positive rate: TP / (TP + FN).
    pub sensitivity: f64,
    /// True negative rate: TN / (TN + FP).
    pub specificity: f64,
}

/// Full evaluation of one prediction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    /// Fraction of correct predictions.
    pub accuracy: f64,
    /// Macro-averaged one-vs-rest sensitivity.
    pub sensitivity: f64,
    /// Macro-averaged one-vs-rest specificity.
    pub specificity: f64,
    /// Macro-averaged one-vs-rest ROC-AUC.
    pub roc_auc: f64,
    /// Per-class rates in [`Label::ALL`] order.
    pub per_class: Vec<ClassRates>,
    /// The confusion matrix.
    pub confusion: ConfusionMatrix,
}

/// Fraction of correct predictions.
pub fn accuracy(y_true: &[Label], y_pred: &[Label]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| t == p)
        .count();
    correct as f64 / y_true.len() as f64
}

/// Per-class one-vs-rest sensitivity/specificity from a confusion matrix.
///
/// A class with no true examples gets sensitivity 0; a class covering the
/// whole set gets specificity 0. Degenerate folds are rejected before
/// evaluation, so these cases only arise in direct evaluator use.
pub fn class_rates(confusion: &ConfusionMatrix) -> Vec<ClassRates> {
    let total = confusion.total();

    Label::ALL
        .iter()
        .map(|&label| {
            let tp = confusion.get(label, label);
            let row_total: usize = Label::ALL.iter().map(|&p| confusion.get(label, p)).sum();
            let col_total: usize = Label::ALL.iter().map(|&t| confusion.get(t, label)).sum();

            let fn_ = row_total - tp;
            let fp = col_total - tp;
            let tn = total - tp - fn_ - fp;

            let sensitivity = if tp + fn_ > 0 {
                tp as f64 / (tp + fn_) as f64
            } else {
                0.0
            };
            let specificity = if tn + fp > 0 {
                tn as f64 / (tn + fp) as f64
            } else {
                0.0
            };

            ClassRates {
                label,
                sensitivity,
                specificity,
            }
        })
        .collect()
}

/// Macro-averaged one-vs-rest ROC-AUC.
///
/// Each class in turn is treated as positive with its predicted probability
/// as the score; AUC per class is the rank-based (Mann-Whitney) statistic
/// with midrank tie handling. Classes absent from `y_true`, or covering all
/// of it, contribute no term to the average.
pub fn roc_auc(y_true: &[Label], probabilities: &[[f64; Label::COUNT]]) -> f64 {
    let mut sum = 0.0;
    let mut classes = 0;

    for &label in &Label::ALL {
        let c = label.index();
        let scores: Vec<f64> = probabilities.iter().map(|p| p[c]).collect();
        let positives: Vec<bool> = y_true.iter().map(|t| *t == label).collect();

        if let Some(auc) = binary_auc(&scores, &positives) {
            sum += auc;
            classes += 1;
        }
    }

    if classes == 0 { 0.0 } else { sum / classes as f64 }
}

/// Rank-based AUC for one binary problem. `None` when either class is empty.
fn binary_auc(scores: &[f64], positives: &[bool]) -> Option<f64> {
    let n_pos = positives.iter().filter(|p| **p).count();
    let n_neg = positives.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return None;
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| {
        scores[a]
            .partial_cmp(&scores[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    // Midranks: tied scores share the average of their rank range.
    let mut ranks = vec![0.0f64; scores.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && scores[order[j + 1]] == scores[order[i]] {
            j += 1;
        }
        let midrank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = midrank;
        }
        i = j + 1;
    }

    let rank_sum: f64 = positives
        .iter()
        .zip(ranks.iter())
        .filter(|(p, _)| **p)
        .map(|(_, r)| *r)
        .sum();

    let auc = (rank_sum - (n_pos * (n_pos + 1)) as f64 / 2.0) / (n_pos * n_neg) as f64;
    Some(auc)
}

/// Evaluate a prediction run against true labels.
///
/// # Errors
///
/// Returns a data error when the inputs are empty or misaligned.
pub fn evaluate(y_true: &[Label], predictions: &[Prediction]) -> Result<Evaluation> {
    if y_true.is_empty() {
        return Err(TonalityError::data("cannot evaluate an empty prediction run"));
    }
    if y_true.len() != predictions.len() {
        return Err(TonalityError::data(format!(
            "true labels ({}) and predictions ({}) must match",
            y_true.len(),
            predictions.len()
        )));
    }

    let y_pred: Vec<Label> = predictions.iter().map(|p| p.label).collect();
    let probabilities: Vec<[f64; Label::COUNT]> =
        predictions.iter().map(|p| p.probabilities).collect();

    let confusion = ConfusionMatrix::from_pairs(y_true, &y_pred);
    let per_class = class_rates(&confusion);
    let k = per_class.len() as f64;

    Ok(Evaluation {
        accuracy: accuracy(y_true, &y_pred),
        sensitivity: per_class.iter().map(|r| r.sensitivity).sum::<f64>() / k,
        specificity: per_class.iter().map(|r| r.specificity).sum::<f64>() / k,
        roc_auc: roc_auc(y_true, &probabilities),
        per_class,
        confusion,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use Label::{Negative, Neutral, Positive};

    #[test]
    fn test_accuracy() {
        let y_true = [Positive, Negative, Neutral, Positive];
        let y_pred = [Positive, Negative, Positive, Negative];
        assert_eq!(accuracy(&y_true, &y_pred), 0.5);
        assert_eq!(accuracy(&[], &[]), 0.0);
    }

    #[test]
    fn test_confusion_matrix_layout() {
        let y_true = [Positive, Positive, Negative, Neutral];
        let y_pred = [Positive, Negative, Negative, Positive];
        let cm = ConfusionMatrix::from_pairs(&y_true, &y_pred);

        assert_eq!(cm.get(Positive, Positive), 1);
        assert_eq!(cm.get(Positive, Negative), 1);
        assert_eq!(cm.get(Negative, Negative), 1);
        assert_eq!(cm.get(Neutral, Positive), 1);
        assert_eq!(cm.get(Neutral, Neutral), 0);
        assert_eq!(cm.total(), 4);
        assert_eq!(cm.accuracy(), 0.5);
    }

    #[test]
    fn test_class_rates_one_vs_rest() {
        // Positive: 2 true, 1 recovered; one false positive from Neutral.
        let y_true = [Positive, Positive, Negative, Neutral];
        let y_pred = [Positive, Negative, Negative, Positive];
        let cm = ConfusionMatrix::from_pairs(&y_true, &y_pred);
        let rates = class_rates(&cm);

        let positive = &rates[Positive.index()];
        assert_eq!(positive.sensitivity, 0.5); // TP 1, FN 1
        assert_eq!(positive.specificity, 0.5); // TN 1, FP 1

        let negative = &rates[Negative.index()];
        assert_eq!(negative.sensitivity, 1.0); // TP 1, FN 0
        assert!((negative.specificity - 2.0 / 3.0).abs() < 1e-12); // TN 2, FP 1
    }

    #[test]
    fn test_auc_perfect_and_random() {
        // Perfect ranking.
        let scores = [0.9, 0.8, 0.2, 0.1];
        let positives = [true, true, false, false];
        assert_eq!(binary_auc(&scores, &positives), Some(1.0));

        // Inverted ranking.
        let positives = [false, false, true, true];
        assert_eq!(binary_auc(&scores, &positives), Some(0.0));

        // All scores tied: midranks give 0.5.
        let tied = [0.5, 0.5, 0.5, 0.5];
        let positives = [true, false, true, false];
        assert_eq!(binary_auc(&tied, &positives), Some(0.5));

        // Single-class input has no AUC.
        assert_eq!(binary_auc(&scores, &[true, true, true, true]), None);
    }

    #[test]
    fn test_evaluate_full_run() {
        let y_true = [Positive, Negative, Neutral];
        let predictions = vec![
            Prediction {
                label: Positive,
                probabilities: [0.8, 0.1, 0.1],
            },
            Prediction {
                label: Negative,
                probabilities: [0.1, 0.8, 0.1],
            },
            Prediction {
                label: Neutral,
                probabilities: [0.1, 0.1, 0.8],
            },
        ];

        let eval = evaluate(&y_true, &predictions).unwrap();
        assert_eq!(eval.accuracy, 1.0);
        assert_eq!(eval.sensitivity, 1.0);
        assert_eq!(eval.specificity, 1.0);
        assert_eq!(eval.roc_auc, 1.0);
        assert_eq!(eval.confusion.total(), 3);
    }

    #[test]
    fn test_evaluate_rejects_misaligned_input() {
        let predictions = vec![Prediction {
            label: Positive,
            probabilities: [1.0, 0.0, 0.0],
        }];
        assert!(evaluate(&[], &[]).is_err());
        assert!(evaluate(&[Positive, Negative], &predictions).is_err());
    }
}
