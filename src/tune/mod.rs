//! Hyperparameter tuning: the (fold × lambda) grid sweep, aggregation, and
//! model selection.
//!
//! Every grid cell is a pure function of its own training slice, so the
//! sweep is embarrassingly parallel: cells run on a worker pool and report
//! self-contained results; the per-lambda aggregation (mean and standard
//! error) is order-independent.

pub mod grid;
pub mod select;
pub mod stats;
pub mod task;

pub use grid::{GridSearchTuner, LambdaSummary, MetricSummary, SweepOutcome};
pub use select::{Selection, select};
pub use stats::{SweepStats, SweepStatsCollector};
pub use task::{CellResult, ConvergenceWarning, MetricRecord, TuneTask};
