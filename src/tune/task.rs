//! Grid cell definitions and per-cell results.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::Metric;

/// One cell of the hyperparameter grid: a fold paired with a lambda.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TuneTask {
    /// Zero-based fold identifier (the fold held out for validation).
    pub fold_id: usize,
    /// Position of the lambda in the (ascending) grid.
    pub lambda_index: usize,
    /// Regularization strength.
    pub lambda: f64,
}

/// One metric observation for one grid cell. Append-only: records are
/// consumed by aggregation and never mutated in place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    /// Fold the metric was measured on.
    pub fold_id: usize,
    /// Lambda the model was fit at.
    pub lambda: f64,
    /// Which metric.
    pub metric: Metric,
    /// Observed value.
    pub value: f64,
}

/// Solver-did-not-converge note attached to one grid cell.
///
/// A warning, not an error: the cell's best-effort coefficients were still
/// scored and the sweep continued.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceWarning {
    /// Fold of the affected cell; `None` for the final full-train fit.
    pub fold_id: Option<usize>,
    /// Lambda of the affected cell.
    pub lambda: f64,
    /// Iterations the solver ran before giving up.
    pub iterations: usize,
}

/// Self-contained result of one grid cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellResult {
    /// The cell this result belongs to.
    pub task: TuneTask,
    /// Metric observations for this cell.
    pub records: Vec<MetricRecord>,
    /// Set when the solver stopped at `max_iter` without converging.
    pub warning: Option<ConvergenceWarning>,
    /// Nonzero coefficients in the fitted model.
    pub nonzero_coefficients: usize,
    /// Wall time spent on the cell.
    pub elapsed: Duration,
}

impl CellResult {
    /// Create a result for a completed cell.
    pub fn new(
        task: TuneTask,
        records: Vec<MetricRecord>,
        warning: Option<ConvergenceWarning>,
        nonzero_coefficients: usize,
        elapsed: Duration,
    ) -> Self {
        CellResult {
            task,
            records,
            warning,
            nonzero_coefficients,
            elapsed,
        }
    }

    /// Look up one metric value on this cell.
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        self.records
            .iter()
            .find(|r| r.metric == metric)
            .map(|r| r.value)
    }
}
