//! Cycle Feature Export
//!
//! Loads each configured cycling table, builds the state/action dataset and
//! writes it as a feature CSV, isolating failures per file.

use anyhow::{Context, Result};
use cycle_data::TableLoader;
use dataset::run_pipeline;
use evaluation::{BatchSource, FailedSource};
use serde::Serialize;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

mod export;
mod settings;

pub use export::write_feature_table;
pub use settings::{BatchConfig, LoggingConfig, ENV_PREFIX};

/// Name of the summary file written next to the feature tables
pub const SUMMARY_FILE: &str = "summary.json";

/// Outcome for one exported table
#[derive(Debug, Clone, Serialize)]
pub struct FileSummary {
    pub folder: String,
    pub file: String,
    pub output: PathBuf,
    pub frequency_count: usize,
    pub cycles_retained: usize,
    pub cycles_skipped: usize,
    pub warnings: usize,
}

/// Outcome for a whole batch
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub files_processed: usize,
    pub files_failed: usize,
    pub cycles_retained: usize,
    pub cycles_skipped: usize,
    pub files: Vec<FileSummary>,
    pub failures: Vec<FailedSource>,
}

/// Initialize logging
pub fn init_logging(config: &LoggingConfig) {
    let level = config.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())
            .expect("Failed to set tracing subscriber");
    } else {
        tracing::subscriber::set_global_default(builder.finish())
            .expect("Failed to set tracing subscriber");
    }
}

/// Export one source into `output_dir/<folder>/<stem>_features.csv`
pub fn export_source(
    loader: &TableLoader,
    config: &BatchConfig,
    source: &BatchSource,
) -> Result<FileSummary> {
    let rows = loader
        .load_path(&source.path)
        .with_context(|| format!("loading {}", source.path.display()))?;
    let dataset = run_pipeline(&rows, &config.pipeline)
        .with_context(|| format!("assembling {}", source.path.display()))?;

    if dataset.is_empty() {
        warn!("No cycles retained from {}", source.path.display());
    }

    let output = feature_path(&config.output_dir, source);
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let file = File::create(&output).with_context(|| format!("creating {}", output.display()))?;
    write_feature_table(&dataset, BufWriter::new(file))
        .with_context(|| format!("writing {}", output.display()))?;

    info!(
        "Exported {} cycles x {} features to {}",
        dataset.n_samples(),
        dataset.n_features(),
        output.display()
    );

    Ok(FileSummary {
        folder: source.folder.clone(),
        file: source.file_name(),
        output,
        frequency_count: dataset.frequency_count,
        cycles_retained: dataset.n_samples(),
        cycles_skipped: dataset.skipped.len(),
        warnings: dataset.warnings.len(),
    })
}

/// Process every configured source and write the run summary
pub fn run(config: &BatchConfig) -> Result<RunSummary> {
    fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("creating {}", config.output_dir.display()))?;

    let loader = TableLoader::new(config.loader.clone());
    let mut summary = RunSummary::default();

    for source in &config.sources {
        match export_source(&loader, config, source) {
            Ok(file) => {
                summary.files_processed += 1;
                summary.cycles_retained += file.cycles_retained;
                summary.cycles_skipped += file.cycles_skipped;
                summary.files.push(file);
            }
            Err(e) => {
                error!("Error processing {}: {:#}", source.path.display(), e);
                summary.files_failed += 1;
                summary.failures.push(FailedSource {
                    folder: source.folder.clone(),
                    file: source.file_name(),
                    error: format!("{:#}", e),
                });
            }
        }
    }

    let summary_path = config.output_dir.join(SUMMARY_FILE);
    let file = File::create(&summary_path)
        .with_context(|| format!("creating {}", summary_path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &summary)
        .context("writing run summary")?;

    info!(
        "Processed {} files ({} failed), {} cycles retained",
        summary.files_processed, summary.files_failed, summary.cycles_retained
    );
    Ok(summary)
}

fn feature_path(output_dir: &Path, source: &BatchSource) -> PathBuf {
    let stem = source
        .path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "table".to_string());
    output_dir
        .join(&source.folder)
        .join(format!("{}_features.csv", stem))
}
