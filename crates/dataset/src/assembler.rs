//! Dataset Assembler

use crate::DatasetError;
use cycle_data::{group_by_cycle, CycleId, MeasurementRow};
use feature_engine::{ActionMap, BuildWarning, StateMap};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

/// Row field used as the regression target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetField {
    /// Maximum cumulative discharge reached in the cycle
    #[default]
    DischargeCapacity,
    /// Maximum logged capacity in the cycle
    Capacity,
}

impl TargetField {
    fn value(&self, row: &MeasurementRow) -> f64 {
        match self {
            TargetField::DischargeCapacity => row.cumulative_discharge,
            TargetField::Capacity => row.capacity,
        }
    }

    /// Maximum non-NaN value over the rows; `None` when there is none
    pub fn max_over(&self, rows: &[&MeasurementRow]) -> Option<f64> {
        rows.iter()
            .map(|r| self.value(r))
            .filter(|v| !v.is_nan())
            .fold(None, |best, v| Some(best.map_or(v, |b: f64| b.max(v))))
    }
}

/// Why a cycle was left out of the dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// State vector length differs from twice the mode frequency count
    DimensionMismatch { actual: usize, expected: usize },
    /// Source table has no rows for the cycle
    NoRows,
    /// Target field has no usable value for the cycle
    MissingTarget,
}

impl SkipReason {
    /// Short label for metrics
    pub fn label(&self) -> &'static str {
        match self {
            SkipReason::DimensionMismatch { .. } => "dimension_mismatch",
            SkipReason::NoRows => "no_rows",
            SkipReason::MissingTarget => "missing_target",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::DimensionMismatch { actual, expected } => write!(
                f,
                "has {} frequency points, expected {}",
                actual / 2,
                expected / 2
            ),
            SkipReason::NoRows => write!(f, "no rows in table"),
            SkipReason::MissingTarget => write!(f, "target is NaN"),
        }
    }
}

/// Cycle left out of the dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedCycle {
    pub cycle_id: CycleId,
    #[serde(flatten)]
    pub reason: SkipReason,
}

/// Assembled regression dataset
#[derive(Debug, Clone)]
pub struct Dataset {
    /// One row per retained cycle: state vector then action vector
    pub features: Array2<f64>,
    /// Target per row
    pub targets: Array1<f64>,
    /// Cycle of each row, ascending
    pub cycle_ids: Vec<CycleId>,
    /// Column names of `features`
    pub feature_names: Vec<String>,
    /// Mode frequency count the state vectors were held to
    pub frequency_count: usize,
    /// Cycles left out, ascending
    pub skipped: Vec<SkippedCycle>,
    /// Warnings carried over from state extraction
    pub warnings: Vec<BuildWarning>,
}

impl Dataset {
    /// Number of rows
    pub fn n_samples(&self) -> usize {
        self.features.nrows()
    }

    /// Number of feature columns
    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    /// Whether no cycle was retained
    pub fn is_empty(&self) -> bool {
        self.n_samples() == 0
    }
}

/// Most common non-zero frequency count across cycles
///
/// Ties go to the count whose first cycle came earliest in the state
/// extractor's iteration.
pub fn mode_frequency_count(states: &StateMap) -> Result<usize, DatasetError> {
    // (frequency count, occurrences), in first-seen order
    let mut tally: Vec<(usize, usize)> = Vec::new();
    for (_, state) in states.iter_first_seen() {
        if state.is_empty() {
            continue;
        }
        let count = state.frequency_count();
        match tally.iter_mut().find(|(f, _)| *f == count) {
            Some(entry) => entry.1 += 1,
            None => tally.push((count, 1)),
        }
    }

    let mut best: Option<(usize, usize)> = None;
    for &(count, occurrences) in &tally {
        if best.map_or(true, |(_, top)| occurrences > top) {
            best = Some((count, occurrences));
        }
    }

    debug!("Frequency count tally: {:?}", tally);
    best.map(|(count, _)| count).ok_or(DatasetError::NoValidCycles)
}

/// Combines state and action maps into a dataset
#[derive(Debug, Clone, Default)]
pub struct DatasetAssembler {
    target: TargetField,
}

impl DatasetAssembler {
    /// Create an assembler for a target field
    pub fn new(target: TargetField) -> Self {
        Self { target }
    }

    /// Assemble the dataset
    ///
    /// Cycles present in both maps are visited in ascending order. Cycles whose
    /// state length differs from the mode, that have no rows, or whose target is
    /// undefined are skipped with a warning. Fails only when no cycle has EIS data.
    pub fn assemble(
        &self,
        rows: &[MeasurementRow],
        states: &StateMap,
        actions: &ActionMap,
    ) -> Result<Dataset, DatasetError> {
        let frequency_count = mode_frequency_count(states)?;
        let expected = frequency_count * 2;
        info!(
            "Most common frequency count is {}, expected state vector length {}",
            frequency_count, expected
        );

        let groups = group_by_cycle(rows);
        let width = expected + actions.dimension();

        let mut data: Vec<f64> = Vec::new();
        let mut targets: Vec<f64> = Vec::new();
        let mut cycle_ids: Vec<CycleId> = Vec::new();
        let mut skipped: Vec<SkippedCycle> = Vec::new();

        for cycle_id in states.cycle_ids() {
            let (Some(state), Some(action)) = (states.get(cycle_id), actions.get(cycle_id)) else {
                continue;
            };

            let verdict = if state.state_vector.len() != expected {
                Err(SkipReason::DimensionMismatch {
                    actual: state.state_vector.len(),
                    expected,
                })
            } else {
                match groups.get(&cycle_id) {
                    None => Err(SkipReason::NoRows),
                    Some(cycle_rows) => self
                        .target
                        .max_over(cycle_rows)
                        .ok_or(SkipReason::MissingTarget),
                }
            };

            match verdict {
                Ok(target) => {
                    data.extend_from_slice(&state.state_vector);
                    data.extend_from_slice(action.as_slice());
                    targets.push(target);
                    cycle_ids.push(cycle_id);
                }
                Err(reason) => {
                    warn!("Skipping cycle {}: {}", cycle_id, reason);
                    metrics::counter!("dataset_cycles_skipped_total", "reason" => reason.label())
                        .increment(1);
                    skipped.push(SkippedCycle { cycle_id, reason });
                }
            }
        }

        metrics::counter!("dataset_cycles_retained_total").increment(cycle_ids.len() as u64);

        let features = Array2::from_shape_vec((cycle_ids.len(), width), data)?;
        info!(
            "Final dataset shapes: X=({}, {}), y=({})",
            features.nrows(),
            features.ncols(),
            targets.len()
        );

        Ok(Dataset {
            features,
            targets: Array1::from(targets),
            cycle_ids,
            feature_names: feature_names(frequency_count, actions),
            frequency_count,
            skipped,
            warnings: states.warnings().to_vec(),
        })
    }
}

fn feature_names(frequency_count: usize, actions: &ActionMap) -> Vec<String> {
    let real = (0..frequency_count).map(|i| format!("Z_re_{}", i));
    let imaginary = (0..frequency_count).map(|i| format!("Z_im_{}", i));
    let action = actions.feature_set().field_names().iter().map(|s| s.to_string());
    real.chain(imaginary).chain(action).collect()
}
