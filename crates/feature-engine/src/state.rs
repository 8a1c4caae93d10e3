//! EIS State Vector Extraction

use crate::band::FrequencyBand;
use crate::features::StateMode;
use crate::label::{imaginary_label, real_label};
use crate::normalizer::ZScore;
use cycle_data::{group_by_cycle, CycleId, MeasurementRow};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{debug, info, warn};

/// Step tags that mark EIS sweep rows
pub const DEFAULT_EIS_STEP_TAGS: [i64; 2] = [1, 6];

/// State extraction configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateConfig {
    /// Frequencies kept before grouping
    pub band: FrequencyBand,
    /// Step tags identifying EIS rows
    pub eis_step_tags: BTreeSet<i64>,
    /// Raw or per-cycle z-scored impedance
    pub mode: StateMode,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            band: FrequencyBand::default(),
            eis_step_tags: DEFAULT_EIS_STEP_TAGS.into_iter().collect(),
            mode: StateMode::Raw,
        }
    }
}

/// Impedance component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    Real,
    Imaginary,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Real => write!(f, "real"),
            Component::Imaginary => write!(f, "imaginary"),
        }
    }
}

/// Non-fatal condition found while building state vectors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BuildWarning {
    /// Component had no spread and was zero-filled instead of scaled
    ZeroVariance {
        cycle_id: CycleId,
        component: Component,
    },
}

impl fmt::Display for BuildWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildWarning::ZeroVariance {
                cycle_id,
                component,
            } => write!(
                f,
                "cycle {}: {} impedance has zero variance, zero-filled",
                cycle_id, component
            ),
        }
    }
}

/// EIS state of one cycle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleState {
    /// `Z_re(<freq>Hz)` / `Z_im(<freq>Hz)` pairs, for inspection only
    pub labeled_impedance: Vec<(String, f64)>,
    /// Real parts then imaginary parts, both in ascending frequency
    pub state_vector: Vec<f64>,
}

impl CycleState {
    /// Number of frequency points (half the vector length)
    pub fn frequency_count(&self) -> usize {
        self.state_vector.len() / 2
    }

    /// Whether the cycle had no EIS rows
    pub fn is_empty(&self) -> bool {
        self.state_vector.is_empty()
    }

    /// Labeled value lookup
    pub fn label(&self, key: &str) -> Option<f64> {
        self.labeled_impedance
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| *v)
    }
}

/// State vectors keyed by cycle
///
/// Iteration is by ascending cycle id; the order in which cycles were first
/// inserted is kept separately for mode tie-breaking.
#[derive(Debug, Clone, Default)]
pub struct StateMap {
    cycles: BTreeMap<CycleId, CycleState>,
    first_seen: Vec<CycleId>,
    warnings: Vec<BuildWarning>,
}

impl StateMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a cycle's state
    pub fn insert(&mut self, cycle_id: CycleId, state: CycleState) {
        if self.cycles.insert(cycle_id, state).is_none() {
            self.first_seen.push(cycle_id);
        }
    }

    /// State of a cycle
    pub fn get(&self, cycle_id: CycleId) -> Option<&CycleState> {
        self.cycles.get(&cycle_id)
    }

    /// Whether a cycle has an entry
    pub fn contains(&self, cycle_id: CycleId) -> bool {
        self.cycles.contains_key(&cycle_id)
    }

    /// Entries in ascending cycle order
    pub fn iter(&self) -> impl Iterator<Item = (CycleId, &CycleState)> {
        self.cycles.iter().map(|(id, state)| (*id, state))
    }

    /// Entries in first-inserted order
    pub fn iter_first_seen(&self) -> impl Iterator<Item = (CycleId, &CycleState)> {
        self.first_seen
            .iter()
            .filter_map(|id| self.cycles.get(id).map(|state| (*id, state)))
    }

    /// Cycle ids in ascending order
    pub fn cycle_ids(&self) -> impl Iterator<Item = CycleId> + '_ {
        self.cycles.keys().copied()
    }

    /// Number of cycles
    pub fn len(&self) -> usize {
        self.cycles.len()
    }

    /// Whether the map has no cycles
    pub fn is_empty(&self) -> bool {
        self.cycles.is_empty()
    }

    /// Warnings raised while building
    pub fn warnings(&self) -> &[BuildWarning] {
        &self.warnings
    }
}

impl FromIterator<(CycleId, CycleState)> for StateMap {
    fn from_iter<I: IntoIterator<Item = (CycleId, CycleState)>>(iter: I) -> Self {
        let mut map = StateMap::new();
        for (cycle_id, state) in iter {
            map.insert(cycle_id, state);
        }
        map
    }
}

/// Builds per-cycle EIS state vectors
#[derive(Debug, Clone, Default)]
pub struct StateExtractor {
    config: StateConfig,
}

impl StateExtractor {
    /// Create an extractor with given config
    pub fn new(config: StateConfig) -> Self {
        Self { config }
    }

    /// Get the active config
    pub fn config(&self) -> &StateConfig {
        &self.config
    }

    /// Build state vectors for every cycle with at least one in-band row
    pub fn build(&self, rows: &[MeasurementRow]) -> StateMap {
        let band = self.config.band;
        let groups = group_by_cycle(rows.iter().filter(|r| band.contains(r.frequency)));

        let mut map = StateMap::new();
        let mut warnings = Vec::new();
        for (cycle_id, group) in &groups {
            let state = self.build_cycle(*cycle_id, group, &mut warnings);
            map.insert(*cycle_id, state);
        }
        map.warnings = warnings;

        let populated = map.iter().filter(|(_, s)| !s.is_empty()).count();
        info!(
            "Built {} state vectors ({} with EIS data, {} warnings, mode={:?})",
            map.len(),
            populated,
            map.warnings.len(),
            self.config.mode
        );
        map
    }

    fn build_cycle(
        &self,
        cycle_id: CycleId,
        group: &[&MeasurementRow],
        warnings: &mut Vec<BuildWarning>,
    ) -> CycleState {
        let mut eis: Vec<&MeasurementRow> = group
            .iter()
            .copied()
            .filter(|r| self.config.eis_step_tags.contains(&r.step_index))
            .collect();

        if eis.is_empty() {
            debug!("Cycle {}: no EIS rows", cycle_id);
            return CycleState::default();
        }

        eis.sort_by(|a, b| a.frequency.total_cmp(&b.frequency));

        // Repeated frequencies collapse to the last row logged for them
        let mut points: Vec<&MeasurementRow> = Vec::with_capacity(eis.len());
        for row in eis {
            if points.last().is_some_and(|last| last.frequency == row.frequency) {
                points.pop();
            }
            points.push(row);
        }

        let mut real: Vec<f64> = points.iter().map(|r| r.impedance_real).collect();
        let mut imaginary: Vec<f64> = points.iter().map(|r| r.impedance_imag).collect();

        if self.config.mode == StateMode::ZScore {
            real = normalize(cycle_id, Component::Real, &real, warnings);
            imaginary = normalize(cycle_id, Component::Imaginary, &imaginary, warnings);
        }

        let mut labeled_impedance: Vec<(String, f64)> = Vec::with_capacity(points.len() * 2);
        for (i, row) in points.iter().enumerate() {
            set_label(&mut labeled_impedance, real_label(row.frequency), real[i]);
            set_label(&mut labeled_impedance, imaginary_label(row.frequency), imaginary[i]);
        }

        debug!("Cycle {}: {} EIS frequency points", cycle_id, points.len());

        let mut state_vector = real;
        state_vector.extend(imaginary);
        CycleState {
            labeled_impedance,
            state_vector,
        }
    }
}

fn normalize(
    cycle_id: CycleId,
    component: Component,
    values: &[f64],
    warnings: &mut Vec<BuildWarning>,
) -> Vec<f64> {
    let scored = ZScore::compute(values);
    if scored.is_degenerate() {
        let warning = BuildWarning::ZeroVariance {
            cycle_id,
            component,
        };
        warn!("{}", warning);
        warnings.push(warning);
    }
    scored.into_values()
}

/// Labels that render identically keep their first position and the latest value
fn set_label(labels: &mut Vec<(String, f64)>, key: String, value: f64) {
    match labels.iter_mut().find(|(k, _)| *k == key) {
        Some(entry) => entry.1 = value,
        None => labels.push((key, value)),
    }
}

/// Build state vectors with the given config
pub fn build_state_vectors(rows: &[MeasurementRow], config: &StateConfig) -> StateMap {
    StateExtractor::new(config.clone()).build(rows)
}
