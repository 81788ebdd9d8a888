//! Stratified k-fold partitioning.
//!
//! Documents are grouped by label, each label group is shuffled with a
//! seeded RNG and dealt round-robin across the folds, so per-label
//! proportions in each fold approximate the corpus-wide proportions. The
//! split is deterministic given the same seed and input order.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::document::Label;
use crate::error::{Result, TonalityError};

/// A partition of document positions into k disjoint folds.
///
/// Positions index into the document slice the split was computed from.
/// Every position appears in exactly one fold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoldAssignment {
    folds: Vec<Vec<usize>>,
}

impl FoldAssignment {
    /// Number of folds.
    pub fn k(&self) -> usize {
        self.folds.len()
    }

    /// Validation positions of fold `i`.
    pub fn validation(&self, i: usize) -> &[usize] {
        &self.folds[i]
    }

    /// Training positions for round `i`: everything outside fold `i`,
    /// in fold order.
    pub fn training(&self, i: usize) -> Vec<usize> {
        self.folds
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .flat_map(|(_, fold)| fold.iter().copied())
            .collect()
    }

    /// All folds in order.
    pub fn folds(&self) -> &[Vec<usize>] {
        &self.folds
    }

    /// Verify that every fold holds at least one document of every label
    /// present in the corpus.
    ///
    /// # Errors
    ///
    /// Returns [`TonalityError::DegenerateFold`] naming the first offending
    /// fold and label.
    pub fn check_labels(&self, labels: &[Label]) -> Result<()> {
        let present: Vec<Label> = Label::ALL
            .into_iter()
            .filter(|l| labels.contains(l))
            .collect();

        for (fold_id, fold) in self.folds.iter().enumerate() {
            for label in &present {
                if !fold.iter().any(|&i| labels[i] == *label) {
                    return Err(TonalityError::degenerate_fold(fold_id, *label));
                }
            }
        }
        Ok(())
    }
}

/// Stratified k-fold splitter.
///
/// # Examples
///
/// ```
/// use tonality::document::Label;
/// use tonality::fold::StratifiedKFold;
///
/// let labels = vec![
///     Label::Positive, Label::Positive, Label::Negative,
///     Label::Negative, Label::Positive, Label::Negative,
/// ];
/// let assignment = StratifiedKFold::new(3, 42).split(&labels).unwrap();
/// assert_eq!(assignment.k(), 3);
///
/// // Every position lands in exactly one fold.
/// let mut all: Vec<usize> = assignment.folds().iter().flatten().copied().collect();
/// all.sort();
/// assert_eq!(all, vec![0, 1, 2, 3, 4, 5]);
/// ```
#[derive(Debug, Clone)]
pub struct StratifiedKFold {
    k: usize,
    seed: u64,
}

impl StratifiedKFold {
    /// Create a splitter with the given fold count and random seed.
    pub fn new(k: usize, seed: u64) -> Self {
        StratifiedKFold { k, seed }
    }

    /// Partition positions `0..labels.len()` into k stratified folds.
    ///
    /// # Errors
    ///
    /// Returns a data error when `k < 2` or `k` exceeds the corpus size.
    pub fn split(&self, labels: &[Label]) -> Result<FoldAssignment> {
        if self.k < 2 {
            return Err(TonalityError::data(format!(
                "fold count must be at least 2, got {}",
                self.k
            )));
        }
        if self.k > labels.len() {
            return Err(TonalityError::data(format!(
                "fold count {} exceeds corpus size {}",
                self.k,
                labels.len()
            )));
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut folds: Vec<Vec<usize>> = vec![Vec::new(); self.k];

        // Iterating Label::ALL keeps the per-label order deterministic.
        for label in Label::ALL {
            let mut group: Vec<usize> = labels
                .iter()
                .enumerate()
                .filter(|(_, l)| **l == label)
                .map(|(i, _)| i)
                .collect();
            group.shuffle(&mut rng);

            // Deal round-robin: shard i of every label forms fold i.
            for (offset, position) in group.into_iter().enumerate() {
                folds[offset % self.k].push(position);
            }
        }

        Ok(FoldAssignment { folds })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn balanced_two_class(n_per_class: usize) -> Vec<Label> {
        let mut labels = vec![Label::Positive; n_per_class];
        labels.extend(vec![Label::Negative; n_per_class]);
        labels
    }

    #[test]
    fn test_partition_is_disjoint_and_exhaustive() {
        let labels = balanced_two_class(17);
        for k in [2, 3, 5] {
            let assignment = StratifiedKFold::new(k, 7).split(&labels).unwrap();
            let mut seen: Vec<usize> = assignment.folds().iter().flatten().copied().collect();
            seen.sort();
            let expected: Vec<usize> = (0..labels.len()).collect();
            assert_eq!(seen, expected, "k={k}");
        }
    }

    #[test]
    fn test_balanced_corpus_yields_near_equal_class_shares() {
        // 100 documents, 2 classes, 5 folds: 10 ± 1 per class per fold.
        let labels = balanced_two_class(50);
        let assignment = StratifiedKFold::new(5, 42).split(&labels).unwrap();

        for fold in assignment.folds() {
            let positive = fold.iter().filter(|&&i| labels[i] == Label::Positive).count();
            let negative = fold.len() - positive;
            assert!((9..=11).contains(&positive), "positive count {positive}");
            assert!((9..=11).contains(&negative), "negative count {negative}");
        }
    }

    #[test]
    fn test_deterministic_given_seed() {
        let labels = balanced_two_class(20);
        let a = StratifiedKFold::new(4, 99).split(&labels).unwrap();
        let b = StratifiedKFold::new(4, 99).split(&labels).unwrap();
        assert_eq!(a.folds(), b.folds());

        let c = StratifiedKFold::new(4, 100).split(&labels).unwrap();
        assert_ne!(a.folds(), c.folds());
    }

    #[test]
    fn test_training_and_validation_are_complementary() {
        let labels = balanced_two_class(12);
        let assignment = StratifiedKFold::new(3, 1).split(&labels).unwrap();

        for i in 0..assignment.k() {
            let mut combined = assignment.training(i);
            combined.extend_from_slice(assignment.validation(i));
            combined.sort();
            let expected: Vec<usize> = (0..labels.len()).collect();
            assert_eq!(combined, expected);
        }
    }

    #[test]
    fn test_invalid_fold_counts_rejected() {
        let labels = balanced_two_class(3);
        assert!(StratifiedKFold::new(1, 0).split(&labels).is_err());
        assert!(StratifiedKFold::new(7, 0).split(&labels).is_err());
    }

    #[test]
    fn test_degenerate_fold_detection() {
        // Two Neutral documents across three folds: one fold must miss it.
        let mut labels = balanced_two_class(6);
        labels.push(Label::Neutral);
        labels.push(Label::Neutral);

        let assignment = StratifiedKFold::new(3, 5).split(&labels).unwrap();
        let err = assignment.check_labels(&labels).unwrap_err();
        assert!(matches!(
            err,
            TonalityError::DegenerateFold {
                label: Label::Neutral,
                ..
            }
        ));
    }

    #[test]
    fn test_check_labels_passes_on_good_split() {
        let labels = balanced_two_class(10);
        let assignment = StratifiedKFold::new(5, 11).split(&labels).unwrap();
        assert!(assignment.check_labels(&labels).is_ok());
    }
}
