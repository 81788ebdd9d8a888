//! L1-regularized multinomial logistic regression.
//!
//! The solver is full-batch proximal gradient descent: each iteration takes
//! a gradient step on the softmax cross-entropy loss, then soft-thresholds
//! the coefficient matrix by `learning_rate * lambda`. Intercepts are never
//! penalized, so as `lambda` grows all coefficients shrink to zero and the
//! model degrades gracefully toward the class-prior null model. A fit that
//! exhausts `max_iter` without converging is a warning, not an error; the
//! best-effort coefficients are still returned.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::Label;
use crate::error::{Result, TonalityError};
use crate::features::tfidf::{DocumentTermMatrix, SparseVector};
use crate::features::vocabulary::Vocabulary;

/// Solver options for [`LassoLogisticRegression::fit`].
#[derive(Debug, Clone)]
pub struct LassoLogisticRegression {
    learning_rate: f64,
    max_iter: usize,
    tol: f64,
}

impl LassoLogisticRegression {
    /// Create a solver with default options.
    pub fn new() -> Self {
        LassoLogisticRegression {
            learning_rate: 0.5,
            max_iter: 500,
            tol: 1e-5,
        }
    }

    /// Set the gradient step size.
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Set the maximum number of iterations.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the convergence tolerance (max absolute parameter change).
    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Fit a model at one fixed `lambda`.
    ///
    /// # Errors
    ///
    /// Returns a model error on shape mismatches, an empty partition, or a
    /// negative `lambda`. Non-convergence is reported through
    /// [`FitOutcome::converged`], not as an error.
    pub fn fit(
        &self,
        features: &DocumentTermMatrix,
        labels: &[Label],
        lambda: f64,
    ) -> Result<FitOutcome> {
        let n_samples = features.n_rows();
        let n_features = features.n_features();

        if n_samples != labels.len() {
            return Err(TonalityError::model(format!(
                "feature rows ({n_samples}) and labels ({}) must match",
                labels.len()
            )));
        }
        if n_samples == 0 {
            return Err(TonalityError::model("cannot fit with zero samples"));
        }
        if lambda < 0.0 {
            return Err(TonalityError::model(format!(
                "lambda must be non-negative, got {lambda}"
            )));
        }

        let classes: Vec<usize> = labels.iter().map(Label::index).collect();
        let mut coefficients = vec![vec![0.0f64; n_features]; Label::COUNT];
        let mut intercepts = vec![0.0f64; Label::COUNT];

        let n = n_samples as f64;
        let threshold = self.learning_rate * lambda;

        let mut converged = false;
        let mut iterations = 0;

        for iter in 1..=self.max_iter {
            iterations = iter;

            let mut coef_grad = vec![vec![0.0f64; n_features]; Label::COUNT];
            let mut intercept_grad = vec![0.0f64; Label::COUNT];

            for (i, row) in features.rows().iter().enumerate() {
                let probs = class_probabilities(row, &coefficients, &intercepts);
                for c in 0..Label::COUNT {
                    let delta = probs[c] - if classes[i] == c { 1.0 } else { 0.0 };
                    intercept_grad[c] += delta;
                    for (j, x) in row.iter() {
                        coef_grad[c][j] += delta * x;
                    }
                }
            }

            let mut max_change = 0.0f64;
            for c in 0..Label::COUNT {
                let next = intercepts[c] - self.learning_rate * intercept_grad[c] / n;
                max_change = max_change.max((next - intercepts[c]).abs());
                intercepts[c] = next;

                for j in 0..n_features {
                    let stepped = coefficients[c][j] - self.learning_rate * coef_grad[c][j] / n;
                    let next = soft_threshold(stepped, threshold);
                    max_change = max_change.max((next - coefficients[c][j]).abs());
                    coefficients[c][j] = next;
                }
            }

            if max_change < self.tol {
                converged = true;
                break;
            }
        }

        let model = Model {
            coefficients,
            intercepts,
            lambda,
            metadata: ModelMetadata {
                trained_at: Utc::now(),
                training_examples: n_samples,
                n_features,
            },
        };

        Ok(FitOutcome {
            model,
            converged,
            iterations,
        })
    }
}

impl Default for LassoLogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

/// Soft-thresholding operator: shrink toward zero by `threshold`.
fn soft_threshold(value: f64, threshold: f64) -> f64 {
    if value > threshold {
        value - threshold
    } else if value < -threshold {
        value + threshold
    } else {
        0.0
    }
}

/// Softmax class probabilities for one feature row.
fn class_probabilities(
    row: &SparseVector,
    coefficients: &[Vec<f64>],
    intercepts: &[f64],
) -> [f64; Label::COUNT] {
    let mut scores = [0.0f64; Label::COUNT];
    for c in 0..Label::COUNT {
        scores[c] = intercepts[c] + row.dot(&coefficients[c]);
    }

    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut sum = 0.0;
    for score in &mut scores {
        *score = (*score - max).exp();
        sum += *score;
    }
    for score in &mut scores {
        *score /= sum;
    }
    scores
}

/// Result of one fit: the model plus convergence information.
#[derive(Debug, Clone)]
pub struct FitOutcome {
    /// The fitted model (best-effort when `converged` is false).
    pub model: Model,
    /// Whether the solver met the tolerance before `max_iter`.
    pub converged: bool,
    /// Iterations actually run.
    pub iterations: usize,
}

/// Metadata attached to a fitted model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Training timestamp.
    pub trained_at: DateTime<Utc>,
    /// Number of training examples used.
    pub training_examples: usize,
    /// Number of features (vocabulary terms).
    pub n_features: usize,
}

/// A prediction for one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    /// The argmax label (ties resolved in fixed label order).
    pub label: Label,
    /// Per-class probabilities in [`Label::ALL`] order; sums to 1.
    pub probabilities: [f64; Label::COUNT],
}

/// A nonzero coefficient, exported for reporting consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermWeight {
    /// Class the coefficient belongs to.
    pub label: Label,
    /// Vocabulary term.
    pub term: String,
    /// Coefficient value.
    pub weight: f64,
}

/// A fitted multinomial model: coefficient matrix (classes × features),
/// per-class intercepts, the lambda it was fit at, and metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    /// Coefficient rows in [`Label::ALL`] order.
    pub coefficients: Vec<Vec<f64>>,
    /// Per-class intercepts in [`Label::ALL`] order.
    pub intercepts: Vec<f64>,
    /// Regularization strength this model was fit at.
    pub lambda: f64,
    /// Fit metadata.
    pub metadata: ModelMetadata,
}

impl Model {
    /// Predict the label and class probabilities for one feature row.
    pub fn predict(&self, row: &SparseVector) -> Prediction {
        let probabilities = class_probabilities(row, &self.coefficients, &self.intercepts);

        let mut best = 0;
        for c in 1..Label::COUNT {
            if probabilities[c] > probabilities[best] {
                best = c;
            }
        }

        Prediction {
            label: Label::ALL[best],
            probabilities,
        }
    }

    /// Predict every row of a partition.
    pub fn predict_all(&self, features: &DocumentTermMatrix) -> Vec<Prediction> {
        features.rows().iter().map(|row| self.predict(row)).collect()
    }

    /// Count of nonzero coefficients across all classes.
    pub fn nonzero_coefficients(&self) -> usize {
        self.coefficients
            .iter()
            .map(|row| row.iter().filter(|w| **w != 0.0).count())
            .sum()
    }

    /// Nonzero coefficients resolved against a vocabulary, sorted by
    /// absolute weight descending. This is the coefficient list handed to
    /// reporting consumers.
    pub fn nonzero_terms(&self, vocabulary: &Vocabulary) -> Vec<TermWeight> {
        let mut terms = Vec::new();
        for (c, row) in self.coefficients.iter().enumerate() {
            for (j, weight) in row.iter().enumerate() {
                if *weight != 0.0 {
                    if let Some(term) = vocabulary.term(j) {
                        terms.push(TermWeight {
                            label: Label::ALL[c],
                            term: term.to_string(),
                            weight: *weight,
                        });
                    }
                }
            }
        }
        terms.sort_by(|a, b| {
            b.weight
                .abs()
                .partial_cmp(&a.weight.abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        terms
    }

    /// Save the model as JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a model saved with [`Model::save`].
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}
