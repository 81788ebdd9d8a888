//! # Tonality
//!
//! Sentence-level sentiment classification for Rust: TF-IDF features over a
//! bounded vocabulary, an L1-regularized multinomial classifier, and nested
//! cross-validation for hyperparameter selection.
//!
//! ## Features
//!
//! - Word and n-gram tokenization with stop word and numeric filtering
//! - Bounded, deterministic vocabulary selection
//! - Leak-free TF-IDF: statistics fit on training partitions only
//! - Stratified k-fold splitting with degenerate-fold detection
//! - Parallel (fold × lambda) grid search with best-metric and
//!   one-standard-error selection
//! - Accuracy, sensitivity/specificity, ROC-AUC, and confusion matrices as
//!   plain serializable data

pub mod analysis;
pub mod config;
pub mod document;
pub mod error;
pub mod evaluate;
pub mod features;
pub mod fold;
pub mod model;
pub mod pipeline;
pub mod tune;

pub mod prelude {
    //! Convenience re-exports for typical use.
    pub use crate::config::{Metric, PipelineConfig, SelectionRule, log_space};
    pub use crate::document::{Document, Label};
    pub use crate::error::{Result, TonalityError};
    pub use crate::pipeline::{FittedPipeline, RunReport, SentimentPipeline};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
