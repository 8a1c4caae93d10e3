//! Capacity Model Evaluation
//!
//! Scores an externally trained regressor ensemble on assembled datasets and
//! writes one summary record per source file.

mod batch;
mod ensemble;
mod metrics;
mod report;

pub use batch::{BatchEvaluator, BatchOutcome, BatchSource, FailedSource};
pub use ensemble::{Ensemble, EnsemblePrediction, Regressor};
pub use metrics::{evaluate, RegressionMetrics};
pub use report::{evaluate_dataset, FileReport, ReportWriter};

use thiserror::Error;

/// Errors during evaluation
#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("Length mismatch: {expected} targets, {actual} predictions")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("Cannot evaluate an empty target vector")]
    Empty,
    #[error("Ensemble has no members")]
    EmptyEnsemble,
    #[error("Prediction failed: {0}")]
    Prediction(String),
    #[error(transparent)]
    Table(#[from] cycle_data::TableError),
    #[error(transparent)]
    Dataset(#[from] dataset::DatasetError),
    #[error("Report CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Report I/O error: {0}")]
    Io(#[from] std::io::Error),
}
