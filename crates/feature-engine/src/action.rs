//! Cycling Action Vector Extraction

use crate::features::{FeatureSet, BASIC_ACTION_DIMENSION, EXTENDED_ACTION_DIMENSION};
use crate::statistics::StatisticalFeatures;
use cycle_data::{group_by_cycle, CycleId, MeasurementRow};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Usage statistics for one cycle, shaped by the feature set that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActionVector {
    /// `[i_charge_avg, charge_time_total, q_charge_net,
    ///   i_discharge_avg, discharge_time_total, q_discharge_net]`
    Basic([f64; BASIC_ACTION_DIMENSION]),
    /// `[i_charge_avg, charge_time_total, q_charge_net, energy_charge,
    ///   i_discharge_avg, discharge_time_total, q_discharge_net, energy_discharge,
    ///   efficiency_avg]`
    Extended([f64; EXTENDED_ACTION_DIMENSION]),
}

impl ActionVector {
    /// Values in positional order
    pub fn as_slice(&self) -> &[f64] {
        match self {
            ActionVector::Basic(values) => values.as_slice(),
            ActionVector::Extended(values) => values.as_slice(),
        }
    }

    /// Number of values
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Never true; action vectors have a fixed non-zero length
    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    /// Feature set this vector belongs to
    pub fn feature_set(&self) -> FeatureSet {
        match self {
            ActionVector::Basic(_) => FeatureSet::Basic,
            ActionVector::Extended(_) => FeatureSet::Extended,
        }
    }
}

/// Aggregates of one charge or discharge phase
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhaseSummary {
    /// Mean current (mA)
    pub current_avg: f64,
    /// Total step time (s)
    pub duration_total: f64,
    /// Span of the cumulative capacity field, max minus min (mA.h)
    pub net_quantity: f64,
    /// Total phase energy (W.h)
    pub energy_total: f64,
}

impl PhaseSummary {
    /// Summarize charge rows (`current > 0`)
    pub fn charge(rows: &[&MeasurementRow]) -> Self {
        Self::summarize(
            rows.iter().copied().filter(|r| r.is_charging()),
            |r| r.cumulative_charge,
            |r| r.charge_energy,
        )
    }

    /// Summarize discharge rows (`current < 0`)
    pub fn discharge(rows: &[&MeasurementRow]) -> Self {
        Self::summarize(
            rows.iter().copied().filter(|r| r.is_discharging()),
            |r| r.cumulative_discharge,
            |r| r.discharge_energy,
        )
    }

    /// An empty phase summarizes to all zeros
    fn summarize<'a, I>(
        rows: I,
        quantity: fn(&MeasurementRow) -> f64,
        energy: fn(&MeasurementRow) -> f64,
    ) -> Self
    where
        I: Iterator<Item = &'a MeasurementRow>,
    {
        let phase: Vec<&MeasurementRow> = rows.collect();
        if phase.is_empty() {
            return Self::default();
        }

        let current: Vec<f64> = phase.iter().map(|r| r.current).collect();
        let quantities: Vec<f64> = phase.iter().map(|r| quantity(r)).collect();

        Self {
            current_avg: StatisticalFeatures::compute(&current).mean,
            duration_total: phase.iter().map(|r| r.step_duration).sum(),
            net_quantity: StatisticalFeatures::compute(&quantities).range(),
            energy_total: phase.iter().map(|r| energy(r)).sum(),
        }
    }
}

/// Action vectors keyed by cycle, all of one feature set
#[derive(Debug, Clone)]
pub struct ActionMap {
    feature_set: FeatureSet,
    vectors: BTreeMap<CycleId, ActionVector>,
}

impl ActionMap {
    /// Create an empty map for a feature set
    pub fn new(feature_set: FeatureSet) -> Self {
        Self {
            feature_set,
            vectors: BTreeMap::new(),
        }
    }

    /// Feature set of every vector in the map
    pub fn feature_set(&self) -> FeatureSet {
        self.feature_set
    }

    /// Length of every vector in the map
    pub fn dimension(&self) -> usize {
        self.feature_set.dimension()
    }

    /// Vector of a cycle
    pub fn get(&self, cycle_id: CycleId) -> Option<&ActionVector> {
        self.vectors.get(&cycle_id)
    }

    /// Whether a cycle has an entry
    pub fn contains(&self, cycle_id: CycleId) -> bool {
        self.vectors.contains_key(&cycle_id)
    }

    /// Entries in ascending cycle order
    pub fn iter(&self) -> impl Iterator<Item = (CycleId, &ActionVector)> {
        self.vectors.iter().map(|(id, v)| (*id, v))
    }

    /// Cycle ids in ascending order
    pub fn cycle_ids(&self) -> impl Iterator<Item = CycleId> + '_ {
        self.vectors.keys().copied()
    }

    /// Number of cycles
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Whether the map has no cycles
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

/// Builds per-cycle action vectors
#[derive(Debug, Clone, Default)]
pub struct ActionExtractor {
    feature_set: FeatureSet,
}

impl ActionExtractor {
    /// Create an extractor for a feature set
    pub fn new(feature_set: FeatureSet) -> Self {
        Self { feature_set }
    }

    /// Build one action vector per cycle present in the rows
    pub fn build(&self, rows: &[MeasurementRow]) -> ActionMap {
        let mut map = ActionMap::new(self.feature_set);
        for (cycle_id, group) in group_by_cycle(rows) {
            let vector = self.build_cycle(&group);
            debug!("Cycle {}: action {:?}", cycle_id, vector.as_slice());
            map.vectors.insert(cycle_id, vector);
        }
        info!(
            "Built {} action vectors ({:?}, dim={})",
            map.len(),
            self.feature_set,
            map.dimension()
        );
        map
    }

    fn build_cycle(&self, rows: &[&MeasurementRow]) -> ActionVector {
        let charge = PhaseSummary::charge(rows);
        let discharge = PhaseSummary::discharge(rows);

        match self.feature_set {
            FeatureSet::Basic => ActionVector::Basic([
                charge.current_avg,
                charge.duration_total,
                charge.net_quantity,
                discharge.current_avg,
                discharge.duration_total,
                discharge.net_quantity,
            ]),
            FeatureSet::Extended => {
                let efficiency: Vec<f64> = rows.iter().map(|r| r.efficiency_pct).collect();
                ActionVector::Extended([
                    charge.current_avg,
                    charge.duration_total,
                    charge.net_quantity,
                    charge.energy_total,
                    discharge.current_avg,
                    discharge.duration_total,
                    discharge.net_quantity,
                    discharge.energy_total,
                    StatisticalFeatures::compute(&efficiency).mean,
                ])
            }
        }
    }
}

/// Build action vectors for a feature set
pub fn build_action_vectors(rows: &[MeasurementRow], feature_set: FeatureSet) -> ActionMap {
    ActionExtractor::new(feature_set).build(rows)
}
