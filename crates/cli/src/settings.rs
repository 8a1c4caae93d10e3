//! Batch run configuration

use config::{Config, ConfigError, Environment, File};
use cycle_data::LoaderConfig;
use dataset::PipelineConfig;
use evaluation::BatchSource;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment prefix for overrides, e.g. `CYCLE_FEATURES__OUTPUT_DIR`
pub const ENV_PREFIX: &str = "CYCLE_FEATURES";

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Max level: trace, debug, info, warn or error
    pub level: String,
    /// Emit JSON lines instead of text
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Batch run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Tables to process
    pub sources: Vec<BatchSource>,
    /// Directory receiving feature tables and the run summary
    pub output_dir: PathBuf,
    pub loader: LoaderConfig,
    pub pipeline: PipelineConfig,
    pub logging: LoggingConfig,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            output_dir: PathBuf::from("features"),
            loader: LoaderConfig::default(),
            pipeline: PipelineConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl BatchConfig {
    /// Load from an optional file, then apply environment overrides
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::with_name(path));
        }
        builder
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feature_engine::{FeatureSet, StateMode};

    #[test]
    fn test_defaults() {
        let config = BatchConfig::default();
        assert!(config.sources.is_empty());
        assert!(config.loader.exclude_conditioning_cycle);
        assert_eq!(config.pipeline.feature_set, FeatureSet::Basic);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch.toml");
        std::fs::write(
            &path,
            r#"
output_dir = "out"

[[sources]]
folder = "25C"
path = "data/25C/cell01.csv"

[pipeline]
feature_set = "extended"

[pipeline.state]
mode = "z_score"

[logging]
json = true
"#,
        )
        .unwrap();

        let config = BatchConfig::load(path.to_str()).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.sources.len(), 1);
        assert_eq!(config.sources[0].folder, "25C");
        assert_eq!(config.pipeline.feature_set, FeatureSet::Extended);
        assert_eq!(config.pipeline.state.mode, StateMode::ZScore);
        assert_eq!(config.pipeline.state.band.high_hz, 20000.0);
        assert!(config.logging.json);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(BatchConfig::load(Some("/nonexistent/batch.toml")).is_err());
    }
}
