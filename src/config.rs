//! Pipeline configuration.
//!
//! [`PipelineConfig`] is the single configuration surface the core exposes:
//! tokenization granularity, the vocabulary cap, fold count, the lambda
//! grid, the selection rule, and the random seed. Validation happens once
//! at pipeline entry; the grid sweep never sees a bad configuration.

use serde::{Deserialize, Serialize};

use crate::analysis::stop::StopWords;
use crate::analysis::tokenizer::WordGramTokenizer;
use crate::error::{Result, TonalityError};
use crate::model::logistic::LassoLogisticRegression;

/// Which aggregate metric the tuner optimizes.
///
/// Serializes in snake case so exported records carry the same names as
/// [`Metric::as_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Fraction of correct predictions.
    Accuracy,
    /// Macro-averaged one-vs-rest sensitivity.
    Sensitivity,
    /// Macro-averaged one-vs-rest specificity.
    Specificity,
    /// Macro-averaged one-vs-rest ROC-AUC.
    RocAuc,
}

impl Metric {
    /// All metrics recorded per grid cell.
    pub const ALL: [Metric; 4] = [
        Metric::Accuracy,
        Metric::Sensitivity,
        Metric::Specificity,
        Metric::RocAuc,
    ];

    /// Metric name as it appears in exported records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Accuracy => "accuracy",
            Metric::Sensitivity => "sensitivity",
            Metric::Specificity => "specificity",
            Metric::RocAuc => "roc_auc",
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the tuner picks a lambda from the aggregated sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionRule {
    /// The lambda maximizing the aggregate objective metric.
    BestMetric,
    /// The most-regularized lambda whose aggregate objective is within one
    /// standard error of the best: a small, statistically insignificant
    /// loss traded for a sparser model.
    OneStandardError,
}

/// Log-spaced grid of `n` values from `lo` to `hi` inclusive, ascending.
///
/// # Examples
///
/// ```
/// use tonality::config::log_space;
///
/// let grid = log_space(0.001, 10.0, 5);
/// assert_eq!(grid.len(), 5);
/// assert!((grid[0] - 0.001).abs() < 1e-12);
/// assert!((grid[4] - 10.0).abs() < 1e-9);
/// assert!(grid.windows(2).all(|w| w[0] < w[1]));
/// ```
pub fn log_space(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    assert!(lo > 0.0 && hi > lo, "log_space needs 0 < lo < hi");
    if n == 1 {
        return vec![lo];
    }
    let (log_lo, log_hi) = (lo.ln(), hi.ln());
    let step = (log_hi - log_lo) / (n - 1) as f64;
    (0..n).map(|i| (log_lo + step * i as f64).exp()).collect()
}

/// Configuration for the full tuning pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Vocabulary cardinality cap.
    pub max_tokens: usize,
    /// N-gram window size.
    pub gram_size: usize,
    /// Smallest window size in mixed-order mode (`min_gram_size <= gram_size`).
    pub min_gram_size: usize,
    /// Drop purely numeric tokens before windowing.
    pub strip_numeric: bool,
    /// Stop word set (empty set disables filtering).
    pub stop_words: StopWords,
    /// Remove stop words from the word stream before windowing.
    pub filter_gram_parts: bool,
    /// Number of cross-validation folds.
    pub k_folds: usize,
    /// Ascending regularization grid.
    pub lambda_grid: Vec<f64>,
    /// How the tuner picks a lambda.
    pub selection_rule: SelectionRule,
    /// The aggregate metric the selection rule acts on.
    pub objective: Metric,
    /// Seed for the stratified splitter.
    pub random_seed: u64,
    /// Solver options passed to every fit.
    pub solver: LassoLogisticRegression,
    /// Worker threads for the grid sweep; `None` uses all cores.
    pub thread_pool_size: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            max_tokens: 1000,
            gram_size: 1,
            min_gram_size: 1,
            strip_numeric: false,
            stop_words: StopWords::none(),
            filter_gram_parts: false,
            k_folds: 5,
            lambda_grid: log_space(1e-4, 10.0, 30),
            selection_rule: SelectionRule::OneStandardError,
            objective: Metric::Accuracy,
            random_seed: 42,
            solver: LassoLogisticRegression::new(),
            thread_pool_size: None,
        }
    }
}

impl PipelineConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the vocabulary cap.
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the n-gram window bounds.
    pub fn with_gram_sizes(mut self, min_gram_size: usize, gram_size: usize) -> Self {
        self.min_gram_size = min_gram_size;
        self.gram_size = gram_size;
        self
    }

    /// Drop purely numeric tokens.
    pub fn with_strip_numeric(mut self, strip: bool) -> Self {
        self.strip_numeric = strip;
        self
    }

    /// Set the stop word set.
    pub fn with_stop_words(mut self, stop_words: StopWords) -> Self {
        self.stop_words = stop_words;
        self
    }

    /// Set the fold count.
    pub fn with_k_folds(mut self, k_folds: usize) -> Self {
        self.k_folds = k_folds;
        self
    }

    /// Set the regularization grid (must be ascending, non-negative).
    pub fn with_lambda_grid(mut self, lambda_grid: Vec<f64>) -> Self {
        self.lambda_grid = lambda_grid;
        self
    }

    /// Set the selection rule.
    pub fn with_selection_rule(mut self, rule: SelectionRule) -> Self {
        self.selection_rule = rule;
        self
    }

    /// Set the objective metric.
    pub fn with_objective(mut self, objective: Metric) -> Self {
        self.objective = objective;
        self
    }

    /// Set the random seed.
    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    /// Set the solver options.
    pub fn with_solver(mut self, solver: LassoLogisticRegression) -> Self {
        self.solver = solver;
        self
    }

    /// Set the sweep thread pool size.
    pub fn with_thread_pool_size(mut self, size: usize) -> Self {
        self.thread_pool_size = Some(size);
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.max_tokens == 0 {
            return Err(TonalityError::config("max_tokens must be at least 1"));
        }
        if self.min_gram_size == 0 || self.min_gram_size > self.gram_size {
            return Err(TonalityError::config(format!(
                "gram bounds must satisfy 1 <= min_gram_size <= gram_size, got {}..{}",
                self.min_gram_size, self.gram_size
            )));
        }
        if self.k_folds < 2 {
            return Err(TonalityError::config("k_folds must be at least 2"));
        }
        if self.lambda_grid.is_empty() {
            return Err(TonalityError::config("lambda_grid must not be empty"));
        }
        if self.lambda_grid.iter().any(|l| *l < 0.0 || !l.is_finite()) {
            return Err(TonalityError::config(
                "lambda_grid values must be finite and non-negative",
            ));
        }
        if self.lambda_grid.windows(2).any(|w| w[0] >= w[1]) {
            return Err(TonalityError::config(
                "lambda_grid must be strictly ascending",
            ));
        }
        if self.thread_pool_size == Some(0) {
            return Err(TonalityError::config("thread_pool_size must be at least 1"));
        }
        Ok(())
    }

    /// Build the tokenizer described by this configuration.
    pub fn build_tokenizer(&self) -> Result<WordGramTokenizer> {
        Ok(
            WordGramTokenizer::new(self.min_gram_size, self.gram_size)?
                .with_strip_numeric(self.strip_numeric)
                .with_stop_words(self.stop_words.clone())
                .with_filter_gram_parts(self.filter_gram_parts),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_log_space_is_ascending_and_inclusive() {
        let grid = log_space(1e-4, 10.0, 30);
        assert_eq!(grid.len(), 30);
        assert!((grid[0] - 1e-4).abs() < 1e-15);
        assert!((grid[29] - 10.0).abs() < 1e-9);
        assert!(grid.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_validation_catches_bad_values() {
        assert!(PipelineConfig::new().with_max_tokens(0).validate().is_err());
        assert!(PipelineConfig::new().with_gram_sizes(0, 1).validate().is_err());
        assert!(PipelineConfig::new().with_gram_sizes(3, 2).validate().is_err());
        assert!(PipelineConfig::new().with_k_folds(1).validate().is_err());
        assert!(PipelineConfig::new().with_lambda_grid(vec![]).validate().is_err());
        assert!(
            PipelineConfig::new()
                .with_lambda_grid(vec![0.1, 0.1])
                .validate()
                .is_err()
        );
        assert!(
            PipelineConfig::new()
                .with_lambda_grid(vec![-0.1, 0.1])
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_metric_serializes_with_export_names() {
        for metric in Metric::ALL {
            let json = serde_json::to_string(&metric).unwrap();
            assert_eq!(json, format!("\"{}\"", metric.as_str()));
            let back: Metric = serde_json::from_str(&json).unwrap();
            assert_eq!(back, metric);
        }
    }

    #[test]
    fn test_builder_chains() {
        let config = PipelineConfig::new()
            .with_max_tokens(500)
            .with_gram_sizes(1, 2)
            .with_k_folds(10)
            .with_lambda_grid(vec![0.01, 0.1])
            .with_selection_rule(SelectionRule::BestMetric)
            .with_objective(Metric::RocAuc)
            .with_random_seed(7);

        assert!(config.validate().is_ok());
        assert_eq!(config.max_tokens, 500);
        assert_eq!(config.gram_size, 2);
        assert_eq!(config.k_folds, 10);
        assert_eq!(config.objective, Metric::RocAuc);
    }

    #[test]
    fn test_tokenizer_reflects_config() {
        let config = PipelineConfig::new().with_gram_sizes(1, 2);
        let tokenizer = config.build_tokenizer().unwrap();
        use crate::analysis::tokenizer::Tokenizer;
        let tokens = tokenizer.token_texts("good film").unwrap();
        assert_eq!(tokens, vec!["good", "good film", "film"]);
    }
}
