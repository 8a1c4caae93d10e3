//! Column Schema, Header Repair, and Validation

use crate::error::TableError;
use csv::StringRecord;
use tracing::{debug, warn};

/// Header some spreadsheet exports write in place of the imaginary impedance column
pub const IMAGINARY_HEADER_ALIAS: &str = "#NAME?";

/// Columns the loader requires, in `MeasurementRow` field order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    CycleNumber,
    StepIndex,
    Frequency,
    ImpedanceReal,
    ImpedanceImag,
    Current,
    StepTime,
    ChargeCapacity,
    DischargeCapacity,
    ChargeEnergy,
    DischargeEnergy,
    Efficiency,
    Capacity,
}

/// Every required column
pub const REQUIRED_COLUMNS: [Column; 13] = [
    Column::CycleNumber,
    Column::StepIndex,
    Column::Frequency,
    Column::ImpedanceReal,
    Column::ImpedanceImag,
    Column::Current,
    Column::StepTime,
    Column::ChargeCapacity,
    Column::DischargeCapacity,
    Column::ChargeEnergy,
    Column::DischargeEnergy,
    Column::Efficiency,
    Column::Capacity,
];

impl Column {
    /// Header text as written by the cycler export
    pub fn header(&self) -> &'static str {
        match self {
            Column::CycleNumber => "cycle number",
            Column::StepIndex => "Ns",
            Column::Frequency => "freq/Hz",
            Column::ImpedanceReal => "Re(Z)/Ohm",
            Column::ImpedanceImag => "Im(Z)/Ohm",
            Column::Current => "I/mA",
            Column::StepTime => "step time/s",
            Column::ChargeCapacity => "Q charge/mA.h",
            Column::DischargeCapacity => "Q discharge/mA.h",
            Column::ChargeEnergy => "Energy charge/W.h",
            Column::DischargeEnergy => "Energy discharge/W.h",
            Column::Efficiency => "Efficiency/%",
            Column::Capacity => "Capacity/mA.h",
        }
    }

    pub(crate) fn ordinal(&self) -> usize {
        *self as usize
    }
}

/// Rename the unreadable imaginary impedance header when the real one is absent
pub fn repair_headers(headers: &StringRecord) -> StringRecord {
    let has_imaginary = headers
        .iter()
        .any(|h| h.trim() == Column::ImpedanceImag.header());
    if has_imaginary {
        return headers.clone();
    }

    headers
        .iter()
        .map(|h| {
            if h.trim() == IMAGINARY_HEADER_ALIAS {
                warn!(
                    "Repairing header {} -> {}",
                    IMAGINARY_HEADER_ALIAS,
                    Column::ImpedanceImag.header()
                );
                Column::ImpedanceImag.header()
            } else {
                h
            }
        })
        .collect()
}

/// Positions of the required columns within a record
#[derive(Debug, Clone)]
pub struct ColumnIndex {
    positions: [usize; REQUIRED_COLUMNS.len()],
}

impl ColumnIndex {
    /// Locate every required column, failing on the first one missing
    pub fn resolve(headers: &StringRecord) -> Result<Self, TableError> {
        let mut positions = [0usize; REQUIRED_COLUMNS.len()];
        for column in REQUIRED_COLUMNS {
            let position = headers
                .iter()
                .position(|h| h.trim() == column.header())
                .ok_or(TableError::MissingColumn(column.header()))?;
            positions[column.ordinal()] = position;
        }
        debug!("Resolved {} required columns", positions.len());
        Ok(Self { positions })
    }

    /// Record position of a column
    pub fn position(&self, column: Column) -> usize {
        self.positions[column.ordinal()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_headers() -> StringRecord {
        REQUIRED_COLUMNS.iter().map(|c| c.header()).collect()
    }

    #[test]
    fn test_resolve_all_columns() {
        let mut headers: Vec<&str> = vec!["time/s"];
        headers.extend(REQUIRED_COLUMNS.iter().map(|c| c.header()));
        let index = ColumnIndex::resolve(&StringRecord::from(headers)).unwrap();
        assert_eq!(index.position(Column::CycleNumber), 1);
        assert_eq!(index.position(Column::Capacity), 13);
    }

    #[test]
    fn test_missing_column() {
        let headers: StringRecord = REQUIRED_COLUMNS
            .iter()
            .filter(|c| **c != Column::Efficiency)
            .map(|c| c.header())
            .collect();
        let err = ColumnIndex::resolve(&headers).unwrap_err();
        assert!(matches!(err, TableError::MissingColumn("Efficiency/%")));
    }

    #[test]
    fn test_repair_alias_header() {
        let headers: StringRecord = full_headers()
            .iter()
            .map(|h| if h == "Im(Z)/Ohm" { IMAGINARY_HEADER_ALIAS } else { h })
            .collect();
        let repaired = repair_headers(&headers);
        assert!(ColumnIndex::resolve(&repaired).is_ok());
    }

    #[test]
    fn test_repair_keeps_existing_imaginary() {
        let base = full_headers();
        let mut headers: Vec<&str> = base.iter().collect();
        headers.push(IMAGINARY_HEADER_ALIAS);
        let repaired = repair_headers(&StringRecord::from(headers));
        assert_eq!(repaired.get(repaired.len() - 1), Some(IMAGINARY_HEADER_ALIAS));
    }
}
