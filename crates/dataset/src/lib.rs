//! Regression Dataset Assembly
//!
//! Selects the dominant EIS dimensionality, drops cycles that do not match it,
//! and pairs each remaining cycle's state and action vectors with its target.

mod assembler;
mod pipeline;

pub use assembler::{
    mode_frequency_count, Dataset, DatasetAssembler, SkipReason, SkippedCycle, TargetField,
};
pub use pipeline::{run_pipeline, PipelineConfig};

use thiserror::Error;

/// Errors that stop assembly of a whole dataset
#[derive(Debug, Error)]
pub enum DatasetError {
    /// Every cycle had an empty state vector, so no mode exists
    #[error("No valid cycles: no cycle has a non-empty EIS state vector")]
    NoValidCycles,

    /// Feature buffer did not match the matrix shape
    #[error("Feature matrix shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}
