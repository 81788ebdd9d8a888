//! Classifiers: the L1-regularized multinomial model and the null baseline.

pub mod baseline;
pub mod logistic;

pub use baseline::MajorityBaseline;
pub use logistic::{
    FitOutcome, LassoLogisticRegression, Model, ModelMetadata, Prediction, TermWeight,
};
