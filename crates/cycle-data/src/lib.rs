//! Cycling Measurement Data
//!
//! Provides the measurement row type, cycle grouping, and the CSV table loader
//! that repairs and validates instrument exports before feature extraction.

mod error;
mod loader;
mod schema;
mod table;

pub use error::TableError;
pub use loader::{LoaderConfig, TableLoader};
pub use schema::{Column, IMAGINARY_HEADER_ALIAS, REQUIRED_COLUMNS};
pub use table::{cycle_ids, group_by_cycle, CycleRows};

use serde::{Deserialize, Serialize};

/// Cycle identifier as logged by the cycler
pub type CycleId = i64;

/// One sample of the cycling time series
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRow {
    /// Cycle this row belongs to
    pub cycle_id: CycleId,
    /// Protocol step tag (EIS sweeps are tagged 1 and 6)
    pub step_index: i64,
    /// Frequency (Hz), meaningful on EIS rows only
    pub frequency: f64,
    /// Real impedance (Ohm)
    pub impedance_real: f64,
    /// Imaginary impedance (Ohm)
    pub impedance_imag: f64,
    /// Signed current (mA): positive charges, negative discharges, zero rests
    pub current: f64,
    /// Step duration (s)
    pub step_duration: f64,
    /// Cumulative charge (mA.h)
    pub cumulative_charge: f64,
    /// Cumulative discharge (mA.h)
    pub cumulative_discharge: f64,
    /// Charge energy (W.h)
    pub charge_energy: f64,
    /// Discharge energy (W.h)
    pub discharge_energy: f64,
    /// Coulombic efficiency (%)
    pub efficiency_pct: f64,
    /// Capacity (mA.h)
    pub capacity: f64,
}

impl MeasurementRow {
    /// Whether the row is part of a charge phase
    pub fn is_charging(&self) -> bool {
        self.current > 0.0
    }

    /// Whether the row is part of a discharge phase
    pub fn is_discharging(&self) -> bool {
        self.current < 0.0
    }
}
