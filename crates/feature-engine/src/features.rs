//! Feature Variant Selection

use serde::{Deserialize, Serialize};

/// Number of elements in a basic action vector
pub const BASIC_ACTION_DIMENSION: usize = 6;
/// Number of elements in an extended action vector
pub const EXTENDED_ACTION_DIMENSION: usize = 9;

/// Action vector field names, basic set
pub const BASIC_ACTION_FIELDS: [&str; BASIC_ACTION_DIMENSION] = [
    "i_charge_avg",
    "charge_time_total",
    "q_charge_net",
    "i_discharge_avg",
    "discharge_time_total",
    "q_discharge_net",
];

/// Action vector field names, extended set
pub const EXTENDED_ACTION_FIELDS: [&str; EXTENDED_ACTION_DIMENSION] = [
    "i_charge_avg",
    "charge_time_total",
    "q_charge_net",
    "energy_charge",
    "i_discharge_avg",
    "discharge_time_total",
    "q_discharge_net",
    "energy_discharge",
    "efficiency_avg",
];

/// How EIS state vectors are scaled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateMode {
    /// Impedance as measured
    #[default]
    Raw,
    /// Real and imaginary parts each z-scored with the cycle's own statistics
    ZScore,
}

/// Which usage statistics make up an action vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureSet {
    /// Current, duration and net charge per phase
    #[default]
    Basic,
    /// Basic plus phase energy and mean cycle efficiency
    Extended,
}

impl FeatureSet {
    /// Length of the action vectors this set produces
    pub fn dimension(&self) -> usize {
        match self {
            FeatureSet::Basic => BASIC_ACTION_DIMENSION,
            FeatureSet::Extended => EXTENDED_ACTION_DIMENSION,
        }
    }

    /// Field names in positional order
    pub fn field_names(&self) -> &'static [&'static str] {
        match self {
            FeatureSet::Basic => &BASIC_ACTION_FIELDS,
            FeatureSet::Extended => &EXTENDED_ACTION_FIELDS,
        }
    }
}
