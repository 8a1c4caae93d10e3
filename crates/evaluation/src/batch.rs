//! Batch Evaluation over Source Files

use crate::ensemble::Ensemble;
use crate::report::{evaluate_dataset, FileReport};
use crate::EvaluationError;
use cycle_data::TableLoader;
use dataset::{run_pipeline, PipelineConfig};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{error, info};

/// One input table and the folder label it is reported under
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSource {
    pub folder: String,
    pub path: PathBuf,
}

impl BatchSource {
    pub fn new(folder: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
            path: path.into(),
        }
    }

    /// File name component used in reports
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Source that failed to load, assemble, or predict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedSource {
    pub folder: String,
    pub file: String,
    pub error: String,
}

/// Result of a batch run
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub reports: Vec<FileReport>,
    pub failures: Vec<FailedSource>,
    /// Sources that assembled to an empty dataset
    pub empty: usize,
}

/// Runs load, feature pipeline, and ensemble scoring per source
pub struct BatchEvaluator<'a> {
    loader: TableLoader,
    pipeline: PipelineConfig,
    ensemble: &'a Ensemble,
}

impl<'a> BatchEvaluator<'a> {
    pub fn new(loader: TableLoader, pipeline: PipelineConfig, ensemble: &'a Ensemble) -> Self {
        Self {
            loader,
            pipeline,
            ensemble,
        }
    }

    /// Evaluate a single source
    pub fn evaluate_source(
        &self,
        source: &BatchSource,
    ) -> Result<Option<FileReport>, EvaluationError> {
        let rows = self.loader.load_path(&source.path)?;
        let dataset = run_pipeline(&rows, &self.pipeline)?;
        evaluate_dataset(&source.folder, &source.file_name(), &dataset, self.ensemble)
    }

    /// Evaluate every source; a failing source is recorded and skipped
    pub fn run(&self, sources: &[BatchSource]) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();

        for source in sources {
            match self.evaluate_source(source) {
                Ok(Some(report)) => outcome.reports.push(report),
                Ok(None) => outcome.empty += 1,
                Err(e) => {
                    error!("Error processing {}: {}", source.path.display(), e);
                    outcome.failures.push(FailedSource {
                        folder: source.folder.clone(),
                        file: source.file_name(),
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            "Batch finished: {} evaluated, {} empty, {} failed",
            outcome.reports.len(),
            outcome.empty,
            outcome.failures.len()
        );
        outcome
    }
}
