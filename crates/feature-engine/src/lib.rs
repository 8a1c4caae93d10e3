//! Cycle Feature Engine
//!
//! Builds the per-cycle EIS state vectors and charge/discharge action vectors
//! that the dataset assembler combines into a feature matrix.

mod action;
mod band;
mod features;
mod label;
mod normalizer;
mod state;
mod statistics;

pub use action::{build_action_vectors, ActionExtractor, ActionMap, ActionVector, PhaseSummary};
pub use band::{FrequencyBand, DEFAULT_HIGH_HZ, DEFAULT_LOW_HZ};
pub use features::{
    FeatureSet, StateMode, BASIC_ACTION_DIMENSION, BASIC_ACTION_FIELDS,
    EXTENDED_ACTION_DIMENSION, EXTENDED_ACTION_FIELDS,
};
pub use label::{format_significant, imaginary_label, real_label};
pub use normalizer::ZScore;
pub use state::{
    build_state_vectors, BuildWarning, Component, CycleState, StateConfig, StateExtractor,
    StateMap, DEFAULT_EIS_STEP_TAGS,
};
pub use statistics::StatisticalFeatures;
