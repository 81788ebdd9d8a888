//! Grid search over (fold × lambda) cells.
//!
//! Each cell refits the vocabulary and TF-IDF statistics on its own
//! training slice only, fits the classifier at the cell's lambda, and
//! scores the held-out fold. Cells are mutually independent, so they are
//! dispatched to a worker pool and collected over a channel; the final
//! per-lambda aggregation does not depend on completion order.

use std::sync::Arc;
use std::sync::mpsc;
use std::time::Instant;

use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};

use crate::analysis::tokenizer::Tokenizer;
use crate::config::{Metric, PipelineConfig};
use crate::document::{Document, Label};
use crate::error::{Result, TonalityError};
use crate::evaluate;
use crate::features::tfidf::TfIdfVectorizer;
use crate::features::vocabulary::VocabularyBuilder;
use crate::fold::FoldAssignment;
use crate::model::logistic::LassoLogisticRegression;
use crate::tune::stats::{SweepStats, SweepStatsCollector};
use crate::tune::task::{CellResult, ConvergenceWarning, MetricRecord, TuneTask};

/// Aggregate of one metric across folds at one lambda.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MetricSummary {
    /// Which metric.
    pub metric: Metric,
    /// Mean across folds.
    pub mean: f64,
    /// Standard error of the mean (sample std / sqrt(k)).
    pub std_error: f64,
}

/// Aggregated sweep results for one lambda.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LambdaSummary {
    /// Position in the ascending grid.
    pub lambda_index: usize,
    /// Regularization strength.
    pub lambda: f64,
    /// One summary per recorded metric.
    pub metrics: Vec<MetricSummary>,
    /// Mean nonzero coefficient count across folds.
    pub mean_nonzero_coefficients: f64,
    /// Cells at this lambda whose solver did not converge.
    pub convergence_warnings: usize,
}

impl LambdaSummary {
    /// Look up the aggregate of one metric.
    pub fn metric(&self, metric: Metric) -> Option<&MetricSummary> {
        self.metrics.iter().find(|m| m.metric == metric)
    }
}

/// Everything a finished sweep produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepOutcome {
    /// Per-cell results in (lambda, fold) order.
    pub cells: Vec<CellResult>,
    /// Flat append-only metric records across all cells.
    pub records: Vec<MetricRecord>,
    /// Per-lambda aggregates in ascending lambda order.
    pub summaries: Vec<LambdaSummary>,
    /// Convergence warnings across all cells.
    pub warnings: Vec<ConvergenceWarning>,
    /// Sweep statistics.
    pub stats: SweepStats,
}

/// Drives the hyperparameter grid search across folds.
pub struct GridSearchTuner {
    config: PipelineConfig,
    thread_pool: Arc<ThreadPool>,
}

impl GridSearchTuner {
    /// Create a tuner for the given configuration.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;

        let threads = config.thread_pool_size.unwrap_or_else(num_cpus::get);
        let thread_pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("grid-sweep-{i}"))
            .build()
            .map_err(|e| TonalityError::internal(format!("failed to create thread pool: {e}")))?;

        Ok(GridSearchTuner {
            config,
            thread_pool: Arc::new(thread_pool),
        })
    }

    /// Run the full (fold × lambda) sweep.
    ///
    /// Structural failures in any cell (an empty vocabulary, a fit on a bad
    /// slice) abort the sweep with the offending cell named; convergence
    /// problems are recorded on the cell and do not abort.
    pub fn sweep(&self, documents: &[Document], folds: &FoldAssignment) -> Result<SweepOutcome> {
        let labels: Vec<Label> = documents.iter().map(|d| d.label).collect();
        folds.check_labels(&labels)?;

        // Tokenization is deterministic and partition-independent, so the
        // corpus is tokenized once and shared across cells; vocabulary and
        // idf statistics are refit per training slice below.
        let tokenizer = self.config.build_tokenizer()?;
        let tokens: Vec<Vec<String>> = documents
            .iter()
            .map(|d| tokenizer.token_texts(&d.text))
            .collect::<Result<_>>()?;

        let splits: Vec<(Vec<usize>, Vec<usize>)> = (0..folds.k())
            .map(|i| (folds.training(i), folds.validation(i).to_vec()))
            .collect();

        let tokens = Arc::new(tokens);
        let labels = Arc::new(labels);
        let splits = Arc::new(splits);
        let stats = Arc::new(SweepStatsCollector::new());

        let tasks: Vec<TuneTask> = (0..folds.k())
            .flat_map(|fold_id| {
                self.config
                    .lambda_grid
                    .iter()
                    .enumerate()
                    .map(move |(lambda_index, &lambda)| TuneTask {
                        fold_id,
                        lambda_index,
                        lambda,
                    })
            })
            .collect();
        let num_tasks = tasks.len();

        let (tx, rx) = mpsc::channel();
        for task in tasks {
            let tx = tx.clone();
            let tokens = Arc::clone(&tokens);
            let labels = Arc::clone(&labels);
            let splits = Arc::clone(&splits);
            let stats = Arc::clone(&stats);
            let solver = self.config.solver.clone();
            let max_tokens = self.config.max_tokens;

            self.thread_pool.spawn(move || {
                let (train, validation) = &splits[task.fold_id];
                let result = run_cell(
                    task, &tokens, &labels, train, validation, max_tokens, &solver,
                );
                if let Ok(cell) = &result {
                    stats.record_cell(cell.elapsed, cell.warning.is_none());
                }
                let _ = tx.send(result);
            });
        }
        drop(tx);

        let mut cells = Vec::with_capacity(num_tasks);
        for result in rx {
            cells.push(result?);
        }
        if cells.len() != num_tasks {
            return Err(TonalityError::internal(format!(
                "sweep lost cells: expected {num_tasks}, collected {}",
                cells.len()
            )));
        }

        // Completion order is worker-dependent; fix it for output.
        cells.sort_by_key(|c| (c.task.lambda_index, c.task.fold_id));

        let records: Vec<MetricRecord> = cells.iter().flat_map(|c| c.records.clone()).collect();
        let warnings: Vec<ConvergenceWarning> = cells.iter().filter_map(|c| c.warning).collect();
        let summaries = summarize(&cells, &self.config.lambda_grid);

        Ok(SweepOutcome {
            cells,
            records,
            summaries,
            warnings,
            stats: stats.snapshot(),
        })
    }
}

/// Fit and score one grid cell. Pure function of the cell's slices.
fn run_cell(
    task: TuneTask,
    tokens: &[Vec<String>],
    labels: &[Label],
    train: &[usize],
    validation: &[usize],
    max_tokens: usize,
    solver: &LassoLogisticRegression,
) -> Result<CellResult> {
    let started = Instant::now();

    let train_tokens: Vec<&Vec<String>> = train.iter().map(|&i| &tokens[i]).collect();
    let train_labels: Vec<Label> = train.iter().map(|&i| labels[i]).collect();

    let vectorizer = TfIdfVectorizer::fit(&train_tokens, &VocabularyBuilder::new(max_tokens))
        .map_err(|e| with_cell_context(e, &task))?;
    let train_matrix = vectorizer.transform_all(&train_tokens);

    let outcome = solver
        .fit(&train_matrix, &train_labels, task.lambda)
        .map_err(|e| with_cell_context(e, &task))?;

    let validation_tokens: Vec<&Vec<String>> = validation.iter().map(|&i| &tokens[i]).collect();
    let validation_labels: Vec<Label> = validation.iter().map(|&i| labels[i]).collect();
    let validation_matrix = vectorizer.transform_all(&validation_tokens);

    let predictions = outcome.model.predict_all(&validation_matrix);
    let evaluation = evaluate::evaluate(&validation_labels, &predictions)
        .map_err(|e| with_cell_context(e, &task))?;

    let records = Metric::ALL
        .iter()
        .map(|&metric| MetricRecord {
            fold_id: task.fold_id,
            lambda: task.lambda,
            metric,
            value: match metric {
                Metric::Accuracy => evaluation.accuracy,
                Metric::Sensitivity => evaluation.sensitivity,
                Metric::Specificity => evaluation.specificity,
                Metric::RocAuc => evaluation.roc_auc,
            },
        })
        .collect();

    let warning = (!outcome.converged).then_some(ConvergenceWarning {
        fold_id: Some(task.fold_id),
        lambda: task.lambda,
        iterations: outcome.iterations,
    });

    Ok(CellResult::new(
        task,
        records,
        warning,
        outcome.model.nonzero_coefficients(),
        started.elapsed(),
    ))
}

/// Attach the (fold, lambda) cell to an error without losing its kind.
fn with_cell_context(err: TonalityError, task: &TuneTask) -> TonalityError {
    let ctx = format!("grid cell (fold {}, lambda {})", task.fold_id, task.lambda);
    match err {
        TonalityError::VocabularyEmpty(m) => {
            TonalityError::VocabularyEmpty(format!("{ctx}: {m}"))
        }
        TonalityError::Data(m) => TonalityError::Data(format!("{ctx}: {m}")),
        TonalityError::Model(m) => TonalityError::Model(format!("{ctx}: {m}")),
        other => TonalityError::other(format!("{ctx}: {other}")),
    }
}

/// Group cells by lambda and compute mean / standard error per metric.
fn summarize(cells: &[CellResult], lambda_grid: &[f64]) -> Vec<LambdaSummary> {
    lambda_grid
        .iter()
        .enumerate()
        .map(|(lambda_index, &lambda)| {
            let group: Vec<&CellResult> = cells
                .iter()
                .filter(|c| c.task.lambda_index == lambda_index)
                .collect();

            let metrics = Metric::ALL
                .iter()
                .map(|&metric| {
                    let values: Vec<f64> =
                        group.iter().filter_map(|c| c.metric(metric)).collect();
                    let (mean, std_error) = mean_and_std_error(&values);
                    MetricSummary {
                        metric,
                        mean,
                        std_error,
                    }
                })
                .collect();

            let mean_nonzero_coefficients = if group.is_empty() {
                0.0
            } else {
                group.iter().map(|c| c.nonzero_coefficients as f64).sum::<f64>()
                    / group.len() as f64
            };

            LambdaSummary {
                lambda_index,
                lambda,
                metrics,
                mean_nonzero_coefficients,
                convergence_warnings: group.iter().filter(|c| c.warning.is_some()).count(),
            }
        })
        .collect()
}

/// Mean and standard error of the mean. Standard error is 0 for fewer than
/// two observations.
fn mean_and_std_error(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if values.len() < 2 {
        return (mean, 0.0);
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (mean, (variance / n).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SelectionRule;
    use crate::fold::StratifiedKFold;

    fn corpus() -> Vec<Document> {
        let positive = [
            "great wonderful superb film",
            "loved it great superb acting",
            "wonderful great story line",
            "superb wonderful direction great",
            "great film wonderful cast",
            "superb story great pacing",
        ];
        let negative = [
            "awful terrible dreadful film",
            "hated it awful terrible acting",
            "terrible dreadful story line",
            "dreadful awful direction terrible",
            "awful film terrible cast",
            "dreadful story terrible pacing",
        ];
        let neutral = [
            "average plain ordinary film",
            "watched it average plain acting",
            "plain ordinary story line",
            "ordinary average direction plain",
            "average film plain cast",
            "ordinary story plain pacing",
        ];

        let mut documents = Vec::new();
        let mut id = 0;
        for text in positive {
            documents.push(Document::new(id, text, Label::Positive));
            id += 1;
        }
        for text in negative {
            documents.push(Document::new(id, text, Label::Negative));
            id += 1;
        }
        for text in neutral {
            documents.push(Document::new(id, text, Label::Neutral));
            id += 1;
        }
        documents
    }

    fn config() -> PipelineConfig {
        PipelineConfig::new()
            .with_k_folds(3)
            .with_lambda_grid(vec![0.001, 0.1, 5.0])
            .with_selection_rule(SelectionRule::BestMetric)
            .with_thread_pool_size(2)
    }

    #[test]
    fn test_sweep_covers_every_cell() {
        let documents = corpus();
        let config = config();
        let folds = StratifiedKFold::new(config.k_folds, config.random_seed)
            .split(&documents.iter().map(|d| d.label).collect::<Vec<_>>())
            .unwrap();

        let tuner = GridSearchTuner::new(config).unwrap();
        let outcome = tuner.sweep(&documents, &folds).unwrap();

        assert_eq!(outcome.cells.len(), 9); // 3 folds × 3 lambdas
        assert_eq!(outcome.records.len(), 9 * Metric::ALL.len());
        assert_eq!(outcome.summaries.len(), 3);
        assert_eq!(outcome.stats.cells_completed, 9);

        // Aggregates exist for every metric at every lambda.
        for summary in &outcome.summaries {
            for metric in Metric::ALL {
                assert!(summary.metric(metric).is_some());
            }
        }
    }

    #[test]
    fn test_heavier_regularization_is_sparser() {
        let documents = corpus();
        let config = config();
        let folds = StratifiedKFold::new(config.k_folds, config.random_seed)
            .split(&documents.iter().map(|d| d.label).collect::<Vec<_>>())
            .unwrap();

        let tuner = GridSearchTuner::new(config).unwrap();
        let outcome = tuner.sweep(&documents, &folds).unwrap();

        let nonzero: Vec<f64> = outcome
            .summaries
            .iter()
            .map(|s| s.mean_nonzero_coefficients)
            .collect();
        for pair in nonzero.windows(2) {
            assert!(pair[1] <= pair[0], "nonzero means {nonzero:?}");
        }
    }

    #[test]
    fn test_degenerate_fold_aborts_before_any_cell() {
        let mut documents = corpus();
        // Two Neutral stragglers cannot cover 3 folds.
        documents.truncate(12);
        documents.push(Document::new(100, "average plain", Label::Neutral));
        documents.push(Document::new(101, "plain ordinary", Label::Neutral));

        let config = config();
        let folds = StratifiedKFold::new(config.k_folds, config.random_seed)
            .split(&documents.iter().map(|d| d.label).collect::<Vec<_>>())
            .unwrap();

        let tuner = GridSearchTuner::new(config).unwrap();
        let err = tuner.sweep(&documents, &folds).unwrap_err();
        assert!(matches!(err, TonalityError::DegenerateFold { .. }));
    }

    #[test]
    fn test_mean_and_std_error() {
        let (mean, se) = mean_and_std_error(&[1.0, 2.0, 3.0]);
        assert!((mean - 2.0).abs() < 1e-12);
        // Sample std 1.0, n = 3.
        assert!((se - 1.0 / 3.0f64.sqrt()).abs() < 1e-12);

        assert_eq!(mean_and_std_error(&[]), (0.0, 0.0));
        assert_eq!(mean_and_std_error(&[0.5]), (0.5, 0.0));
    }
}
