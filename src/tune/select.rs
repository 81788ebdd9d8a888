//! Model selection over aggregated sweep results.
//!
//! Two policies are supported. **Best-metric** picks the lambda with the
//! highest aggregate objective. **One-standard-error** picks the
//! most-regularized (sparsest) lambda whose aggregate is within one
//! standard error of the best: a small, statistically insignificant
//! performance loss traded for a simpler model. Ties always resolve to the
//! larger lambda.

use serde::{Deserialize, Serialize};

use crate::config::{Metric, SelectionRule};
use crate::error::{Result, TonalityError};
use crate::tune::grid::LambdaSummary;

/// An immutable selection outcome, returned per tuning run so results from
/// different runs can never be confused.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Selection {
    /// The chosen lambda.
    pub lambda: f64,
    /// Position of the chosen lambda in the grid.
    pub lambda_index: usize,
    /// The rule that produced this selection.
    pub rule: SelectionRule,
    /// The metric the rule acted on.
    pub objective: Metric,
    /// Aggregate objective at the chosen lambda.
    pub mean: f64,
    /// Standard error of the aggregate at the chosen lambda.
    pub std_error: f64,
}

/// Apply a selection rule to the per-lambda aggregates.
///
/// `summaries` must be in ascending lambda order, as produced by the sweep.
pub fn select(
    summaries: &[LambdaSummary],
    objective: Metric,
    rule: SelectionRule,
) -> Result<Selection> {
    if summaries.is_empty() {
        return Err(TonalityError::data("cannot select from an empty sweep"));
    }

    let scored: Vec<(&LambdaSummary, f64, f64)> = summaries
        .iter()
        .map(|s| {
            s.metric(objective)
                .map(|m| (s, m.mean, m.std_error))
                .ok_or_else(|| {
                    TonalityError::internal(format!(
                        "sweep summaries are missing the {objective} metric"
                    ))
                })
        })
        .collect::<Result<_>>()?;

    // Ascending scan with `>=` keeps the larger lambda on ties.
    let mut best = &scored[0];
    for candidate in &scored[1..] {
        if candidate.1 >= best.1 {
            best = candidate;
        }
    }

    let chosen = match rule {
        SelectionRule::BestMetric => best,
        SelectionRule::OneStandardError => {
            let threshold = best.1 - best.2;
            scored
                .iter()
                .rev()
                .find(|(_, mean, _)| *mean >= threshold)
                .unwrap_or(best)
        }
    };

    Ok(Selection {
        lambda: chosen.0.lambda,
        lambda_index: chosen.0.lambda_index,
        rule,
        objective,
        mean: chosen.1,
        std_error: chosen.2,
    })
}
