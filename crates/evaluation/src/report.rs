//! Per-file Evaluation Reports

use crate::ensemble::Ensemble;
use crate::metrics::evaluate;
use crate::EvaluationError;
use dataset::Dataset;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

/// Summary of one evaluated source file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileReport {
    pub folder: String,
    pub file: String,
    pub num_cycles: usize,
    pub rmse: f64,
    pub r2: f64,
    pub mse: f64,
    pub mae: f64,
    /// Mean of the ensemble mean prediction over cycles
    pub mean_prediction: f64,
    /// Mean of the ensemble spread over cycles
    pub mean_prediction_std: f64,
}

/// Predict one dataset with the ensemble and score it
///
/// Returns `None` when the dataset holds no usable cycles.
pub fn evaluate_dataset(
    folder: &str,
    file: &str,
    dataset: &Dataset,
    ensemble: &Ensemble,
) -> Result<Option<FileReport>, EvaluationError> {
    if dataset.is_empty() {
        warn!("No valid data in {}/{}, skipping", folder, file);
        return Ok(None);
    }

    let prediction = ensemble.predict(dataset.features.view())?;
    let metrics = evaluate(dataset.targets.view(), prediction.mean.view())?;

    let report = FileReport {
        folder: folder.to_string(),
        file: file.to_string(),
        num_cycles: dataset.n_samples(),
        rmse: metrics.rmse,
        r2: metrics.r2,
        mse: metrics.mse,
        mae: metrics.mae,
        mean_prediction: prediction.mean.mean().unwrap_or(f64::NAN),
        mean_prediction_std: prediction.std.mean().unwrap_or(f64::NAN),
    };
    info!(
        "Evaluated {}/{}: {} cycles, RMSE {:.4}",
        folder, file, report.num_cycles, report.rmse
    );
    Ok(Some(report))
}

/// CSV sink for file reports
pub struct ReportWriter<W: Write> {
    inner: csv::Writer<W>,
    written: usize,
}

impl ReportWriter<File> {
    /// Create or truncate a report file
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, EvaluationError> {
        let file = File::create(path.as_ref())?;
        Ok(Self::from_writer(file))
    }
}

impl<W: Write> ReportWriter<W> {
    pub fn from_writer(writer: W) -> Self {
        Self {
            inner: csv::Writer::from_writer(writer),
            written: 0,
        }
    }

    /// Append one report row; the header is emitted with the first row
    pub fn write(&mut self, report: &FileReport) -> Result<(), EvaluationError> {
        self.inner.serialize(report)?;
        self.written += 1;
        Ok(())
    }

    /// Rows written so far
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn flush(&mut self) -> Result<(), EvaluationError> {
        self.inner.flush()?;
        Ok(())
    }

    /// Flush and return the underlying writer
    pub fn into_inner(self) -> Result<W, EvaluationError> {
        self.inner
            .into_inner()
            .map_err(|e| EvaluationError::Io(e.into_error()))
    }
}
