//! Feature Pipeline Composition

use crate::assembler::{Dataset, DatasetAssembler, TargetField};
use crate::DatasetError;
use cycle_data::MeasurementRow;
use feature_engine::{ActionExtractor, FeatureSet, StateConfig, StateExtractor};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Variant selection for one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// State extraction settings
    pub state: StateConfig,
    /// Action vector feature set
    pub feature_set: FeatureSet,
    /// Target column
    pub target: TargetField,
}

/// Extract states and actions, then assemble them into a dataset
pub fn run_pipeline(
    rows: &[MeasurementRow],
    config: &PipelineConfig,
) -> Result<Dataset, DatasetError> {
    info!("Running feature pipeline on {} rows", rows.len());

    let states = StateExtractor::new(config.state.clone()).build(rows);
    let actions = ActionExtractor::new(config.feature_set).build(rows);
    DatasetAssembler::new(config.target).assemble(rows, &states, &actions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cycle_data::CycleId;
    use feature_engine::StateMode;

    fn eis(cycle_id: CycleId, frequency: f64, re: f64, im: f64) -> MeasurementRow {
        MeasurementRow {
            cycle_id,
            step_index: 1,
            frequency,
            impedance_real: re,
            impedance_imag: im,
            ..Default::default()
        }
    }

    fn cycling(cycle_id: CycleId, current: f64, q: f64) -> MeasurementRow {
        let charging = current > 0.0;
        MeasurementRow {
            cycle_id,
            step_index: if charging { 2 } else { 3 },
            current,
            step_duration: 5.0,
            cumulative_charge: if charging { q } else { 0.0 },
            cumulative_discharge: if charging { 0.0 } else { q },
            efficiency_pct: 99.0,
            ..Default::default()
        }
    }

    /// Three in-band EIS points and two rows per phase; target is `capacity`
    fn cycle(cycle_id: CycleId, capacity: f64) -> Vec<MeasurementRow> {
        vec![
            eis(cycle_id, 100.0, 0.03, -0.003),
            eis(cycle_id, 1.0, 0.01, -0.001),
            eis(cycle_id, 10.0, 0.02, -0.002),
            cycling(cycle_id, 1.0, 0.0),
            cycling(cycle_id, 1.0, 2.0),
            cycling(cycle_id, -1.0, capacity - 2.0),
            cycling(cycle_id, -1.0, capacity),
        ]
    }

    #[test]
    fn test_end_to_end_two_cycles() {
        let mut rows = cycle(2, 48.0);
        rows.extend(cycle(1, 50.0));

        let dataset = run_pipeline(&rows, &PipelineConfig::default()).unwrap();
        assert_eq!(dataset.features.dim(), (2, 6 + 6));
        assert_eq!(dataset.targets.to_vec(), vec![50.0, 48.0]);
        assert_eq!(dataset.cycle_ids, vec![1, 2]);

        let first: Vec<f64> = dataset.features.row(0).to_vec();
        assert_eq!(&first[..6], &[0.01, 0.02, 0.03, -0.001, -0.002, -0.003]);
        assert_eq!(&first[6..], &[1.0, 10.0, 2.0, -1.0, 10.0, 2.0]);
    }

    #[test]
    fn test_extended_zscore_run() {
        let mut rows = cycle(1, 50.0);
        rows.extend(cycle(2, 48.0));
        rows.extend(cycle(3, 47.0));

        let config = PipelineConfig {
            state: StateConfig {
                mode: StateMode::ZScore,
                ..Default::default()
            },
            feature_set: FeatureSet::Extended,
            target: TargetField::DischargeCapacity,
        };
        let dataset = run_pipeline(&rows, &config).unwrap();
        assert_eq!(dataset.features.dim(), (3, 6 + 9));
        assert!(dataset.features.iter().all(|v| v.is_finite()));
        assert!(dataset.warnings.is_empty());
    }

    #[test]
    fn test_cycle_zero_processed() {
        let mut rows = cycle(0, 51.0);
        rows.extend(cycle(1, 50.0));
        let dataset = run_pipeline(&rows, &PipelineConfig::default()).unwrap();
        assert_eq!(dataset.cycle_ids, vec![0, 1]);
    }

    #[test]
    fn test_only_cycling_rows_is_fatal() {
        let rows: Vec<MeasurementRow> = cycle(1, 50.0)
            .into_iter()
            .filter(|r| r.step_index != 1)
            .collect();
        let err = run_pipeline(&rows, &PipelineConfig::default()).unwrap_err();
        assert!(matches!(err, DatasetError::NoValidCycles));
    }

    #[test]
    fn test_config_from_json() {
        let config: PipelineConfig = serde_json::from_str(
            r#"{"state": {"mode": "z_score", "band": {"low_hz": 0.5, "high_hz": 1000.0}},
                "feature_set": "extended"}"#,
        )
        .unwrap();
        assert_eq!(config.state.mode, StateMode::ZScore);
        assert_eq!(config.state.band.low_hz, 0.5);
        assert_eq!(config.state.eis_step_tags.len(), 2);
        assert_eq!(config.feature_set, FeatureSet::Extended);
        assert_eq!(config.target, TargetField::DischargeCapacity);
    }
}
