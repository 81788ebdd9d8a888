//! Error types for the tonality library.
//!
//! All fallible operations return [`Result`], whose error type is the
//! [`TonalityError`] enum. Structural problems (bad input data, degenerate
//! fold partitions, an empty vocabulary) are errors and abort the pipeline;
//! per-cell numerical issues such as a solver that stops before converging
//! are *not* errors; they are recorded as warnings on the affected grid
//! cell and the sweep continues.
//!
//! # Examples
//!
//! ```
//! use tonality::error::{Result, TonalityError};
//!
//! fn example_operation() -> Result<()> {
//!     Err(TonalityError::data("corpus is empty"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {e}"),
//! }
//! ```

use std::io;

use thiserror::Error;

use crate::document::Label;

/// The main error type for tonality operations.
#[derive(Error, Debug)]
pub enum TonalityError {
    /// Malformed or inconsistent input data. Detected before any fold work
    /// starts; aborts the whole pipeline.
    #[error("Data error: {0}")]
    Data(String),

    /// A fold contains zero examples of some label that is present in the
    /// corpus. Surfaced with the offending fold, never averaged away.
    #[error("Degenerate fold: fold {fold} contains no {label} documents")]
    DegenerateFold {
        /// Zero-based fold identifier.
        fold: usize,
        /// The label missing from the fold.
        label: Label,
    },

    /// No tokens survived filtering across an entire training partition.
    #[error("Empty vocabulary: {0}")]
    VocabularyEmpty(String),

    /// Text analysis errors (tokenization, filtering).
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Model fitting or prediction errors.
    #[error("Model error: {0}")]
    Model(String),

    /// Invalid pipeline configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// I/O errors (model persistence, report export).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases.
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error.
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with [`TonalityError`].
pub type Result<T> = std::result::Result<T, TonalityError>;

impl TonalityError {
    /// Create a new data error.
    pub fn data<S: Into<String>>(msg: S) -> Self {
        TonalityError::Data(msg.into())
    }

    /// Create a new degenerate-fold error.
    pub fn degenerate_fold(fold: usize, label: Label) -> Self {
        TonalityError::DegenerateFold { fold, label }
    }

    /// Create a new empty-vocabulary error.
    pub fn vocabulary_empty<S: Into<String>>(msg: S) -> Self {
        TonalityError::VocabularyEmpty(msg.into())
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        TonalityError::Analysis(msg.into())
    }

    /// Create a new model error.
    pub fn model<S: Into<String>>(msg: S) -> Self {
        TonalityError::Model(msg.into())
    }

    /// Create a new configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        TonalityError::Config(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        TonalityError::Other(msg.into())
    }

    /// Create a new internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        TonalityError::Other(format!("Internal error: {}", msg.into()))
    }
}
