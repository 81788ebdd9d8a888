//! End-to-end tuning pipeline.
//!
//! The flow is an explicit ordered sequence: validate input documents (fail
//! fast), split stratified folds, run the (fold × lambda) sweep, select a
//! lambda, and only then refit vocabulary, TF-IDF, and classifier on the
//! full training set and score the held-out test set. Each run returns
//! fresh immutable report objects, so results from successive runs can
//! never be confused with each other.
//!
//! # Examples
//!
//! ```no_run
//! use tonality::config::PipelineConfig;
//! use tonality::document::{Document, Label};
//! use tonality::pipeline::SentimentPipeline;
//!
//! let train: Vec<Document> = vec![/* loaded elsewhere */];
//! let test: Vec<Document> = vec![/* loaded elsewhere */];
//!
//! let pipeline = SentimentPipeline::new(PipelineConfig::default()).unwrap();
//! let report = pipeline.run(&train, &test).unwrap();
//! println!(
//!     "selected lambda {} -> test accuracy {:.3}",
//!     report.tuning.selection.lambda, report.test.evaluation.accuracy
//! );
//! ```

use ahash::AHashSet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::tokenizer::{Tokenizer, WordGramTokenizer};
use crate::config::PipelineConfig;
use crate::document::{Document, Label};
use crate::error::{Result, TonalityError};
use crate::evaluate::{self, Evaluation};
use crate::features::tfidf::TfIdfVectorizer;
use crate::features::vocabulary::VocabularyBuilder;
use crate::fold::StratifiedKFold;
use crate::model::baseline::MajorityBaseline;
use crate::model::logistic::{Model, Prediction, TermWeight};
use crate::tune::grid::{GridSearchTuner, LambdaSummary, SweepOutcome};
use crate::tune::select::{Selection, select};
use crate::tune::stats::SweepStats;
use crate::tune::task::{ConvergenceWarning, MetricRecord};

/// Result of one tuning run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TuningReport {
    /// Unique identifier of this run.
    pub run_id: String,
    /// When the run finished.
    pub finished_at: DateTime<Utc>,
    /// Flat append-only metric records from the sweep.
    pub records: Vec<MetricRecord>,
    /// Per-lambda aggregates in ascending lambda order.
    pub summaries: Vec<LambdaSummary>,
    /// Convergence warnings across cells.
    pub warnings: Vec<ConvergenceWarning>,
    /// The selected lambda and the rule that chose it.
    pub selection: Selection,
    /// Sweep statistics.
    pub stats: SweepStats,
}

/// Held-out test evaluation of the final refit model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestReport {
    /// Lambda the final model was fit at.
    pub lambda: f64,
    /// Test-set metrics and confusion matrix.
    pub evaluation: Evaluation,
    /// The null baseline's accuracy on the test set, as the lower bar.
    pub baseline_accuracy: f64,
    /// Nonzero coefficients of the final model, for interpretation.
    pub nonzero_terms: Vec<TermWeight>,
    /// Set when the final fit did not converge.
    pub warning: Option<ConvergenceWarning>,
}

/// Everything one full run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// The tuning half of the run.
    pub tuning: TuningReport,
    /// The held-out test half of the run.
    pub test: TestReport,
}

/// A pipeline fitted on the full training set at one lambda.
pub struct FittedPipeline {
    tokenizer: WordGramTokenizer,
    vectorizer: TfIdfVectorizer,
    model: Model,
    baseline: MajorityBaseline,
    warning: Option<ConvergenceWarning>,
}

impl FittedPipeline {
    /// Predict the label of one raw sentence.
    pub fn predict(&self, text: &str) -> Result<Prediction> {
        let tokens = self.tokenizer.token_texts(text)?;
        Ok(self.model.predict(&self.vectorizer.transform(&tokens)))
    }

    /// The fitted model.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// The TF-IDF vectorizer fitted on the full training set.
    pub fn vectorizer(&self) -> &TfIdfVectorizer {
        &self.vectorizer
    }

    /// The null baseline fitted on the same training labels.
    pub fn baseline(&self) -> &MajorityBaseline {
        &self.baseline
    }

    /// Score labeled documents.
    pub fn evaluate(&self, documents: &[Document]) -> Result<TestReport> {
        if documents.is_empty() {
            return Err(TonalityError::data("test set is empty"));
        }

        let labels: Vec<Label> = documents.iter().map(|d| d.label).collect();
        let predictions = documents
            .iter()
            .map(|d| self.predict(&d.text))
            .collect::<Result<Vec<_>>>()?;
        let evaluation = evaluate::evaluate(&labels, &predictions)?;

        let baseline_label = self.baseline.predict();
        let baseline_accuracy = labels.iter().filter(|l| **l == baseline_label).count() as f64
            / labels.len() as f64;

        Ok(TestReport {
            lambda: self.model.lambda,
            evaluation,
            baseline_accuracy,
            nonzero_terms: self.model.nonzero_terms(self.vectorizer.vocabulary()),
            warning: self.warning,
        })
    }
}

/// The tuning pipeline.
pub struct SentimentPipeline {
    config: PipelineConfig,
}

impl SentimentPipeline {
    /// Create a pipeline, validating the configuration up front.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(SentimentPipeline { config })
    }

    /// The configuration this pipeline runs with.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run nested cross-validation over the training documents and select
    /// a lambda.
    pub fn tune(&self, documents: &[Document]) -> Result<TuningReport> {
        validate_documents(documents)?;

        let labels: Vec<Label> = documents.iter().map(|d| d.label).collect();
        let folds =
            StratifiedKFold::new(self.config.k_folds, self.config.random_seed).split(&labels)?;

        let tuner = GridSearchTuner::new(self.config.clone())?;
        let outcome = tuner.sweep(documents, &folds)?;
        let selection = select(
            &outcome.summaries,
            self.config.objective,
            self.config.selection_rule,
        )?;

        let SweepOutcome {
            records,
            summaries,
            warnings,
            stats,
            ..
        } = outcome;

        Ok(TuningReport {
            run_id: uuid::Uuid::new_v4().to_string(),
            finished_at: Utc::now(),
            records,
            summaries,
            warnings,
            selection,
            stats,
        })
    }

    /// Fit the final pipeline on the full training set at one lambda.
    ///
    /// This is the single sequential refit step that follows selection; it
    /// rebuilds the vocabulary and idf table from the full training
    /// partition, never reusing per-fold statistics.
    pub fn fit(&self, documents: &[Document], lambda: f64) -> Result<FittedPipeline> {
        validate_documents(documents)?;

        let tokenizer = self.config.build_tokenizer()?;
        let tokens: Vec<Vec<String>> = documents
            .iter()
            .map(|d| tokenizer.token_texts(&d.text))
            .collect::<Result<_>>()?;
        let labels: Vec<Label> = documents.iter().map(|d| d.label).collect();

        let vectorizer =
            TfIdfVectorizer::fit(&tokens, &VocabularyBuilder::new(self.config.max_tokens))?;
        let matrix = vectorizer.transform_all(&tokens);

        let outcome = self.config.solver.fit(&matrix, &labels, lambda)?;
        let warning = (!outcome.converged).then_some(ConvergenceWarning {
            fold_id: None,
            lambda,
            iterations: outcome.iterations,
        });

        Ok(FittedPipeline {
            tokenizer,
            vectorizer,
            model: outcome.model,
            baseline: MajorityBaseline::fit(&labels)?,
            warning,
        })
    }

    /// Full flow: tune on the training set, refit at the selected lambda,
    /// and score the held-out test set.
    pub fn run(&self, train: &[Document], test: &[Document]) -> Result<RunReport> {
        let tuning = self.tune(train)?;
        let fitted = self.fit(train, tuning.selection.lambda)?;
        let test = fitted.evaluate(test)?;
        Ok(RunReport { tuning, test })
    }
}

/// Fail-fast input validation: structural problems abort before any fold
/// work starts.
fn validate_documents(documents: &[Document]) -> Result<()> {
    if documents.is_empty() {
        return Err(TonalityError::data("corpus is empty"));
    }

    let mut seen: AHashSet<u64> = AHashSet::with_capacity(documents.len());
    for document in documents {
        if !seen.insert(document.id) {
            return Err(TonalityError::data(format!(
                "duplicate document id {}",
                document.id
            )));
        }
        if document.text.trim().is_empty() {
            return Err(TonalityError::data(format!(
                "document {} has blank text",
                document.id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_structural_problems() {
        assert!(validate_documents(&[]).is_err());

        let duplicate = vec![
            Document::new(1, "fine", Label::Neutral),
            Document::new(1, "fine again", Label::Neutral),
        ];
        assert!(validate_documents(&duplicate).is_err());

        let blank = vec![Document::new(1, "   ", Label::Positive)];
        assert!(validate_documents(&blank).is_err());

        let good = vec![
            Document::new(1, "fine", Label::Neutral),
            Document::new(2, "great", Label::Positive),
        ];
        assert!(validate_documents(&good).is_ok());
    }

    #[test]
    fn test_pipeline_rejects_invalid_config() {
        let config = PipelineConfig::new().with_k_folds(1);
        assert!(SentimentPipeline::new(config).is_err());
    }
}
