//! CSV Table Loader

use crate::error::TableError;
use crate::schema::{repair_headers, Column, ColumnIndex, REQUIRED_COLUMNS};
use crate::MeasurementRow;
use csv::{ReaderBuilder, StringRecord};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Loader configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Drop the synthetic conditioning cycle (cycle 0)
    pub exclude_conditioning_cycle: bool,
    /// Field delimiter
    pub delimiter: char,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            exclude_conditioning_cycle: true,
            delimiter: ',',
        }
    }
}

/// Reads cycler exports into measurement rows
#[derive(Debug, Clone, Default)]
pub struct TableLoader {
    config: LoaderConfig,
}

impl TableLoader {
    /// Create a loader with given config
    pub fn new(config: LoaderConfig) -> Self {
        Self { config }
    }

    /// Load rows from a CSV file
    pub fn load_path<P: AsRef<Path>>(&self, path: P) -> Result<Vec<MeasurementRow>, TableError> {
        debug!("Opening table {}", path.as_ref().display());
        let file = File::open(path.as_ref())?;
        self.load_reader(file)
    }

    /// Load rows from any CSV source
    ///
    /// Rows with an empty or NaN value in any required column are dropped,
    /// as are cycle 0 rows when the conditioning cycle is excluded.
    pub fn load_reader<R: Read>(&self, source: R) -> Result<Vec<MeasurementRow>, TableError> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.config.delimiter as u8)
            .from_reader(source);

        let headers = repair_headers(reader.headers()?);
        let index = ColumnIndex::resolve(&headers)?;

        let mut rows = Vec::new();
        let mut incomplete = 0usize;
        let mut conditioning = 0usize;

        for result in reader.records() {
            let record = result?;
            let record_no = record.position().map(|p| p.record()).unwrap_or(0);

            let Some(values) = read_values(&record, &index, record_no)? else {
                incomplete += 1;
                continue;
            };

            let row = MeasurementRow {
                cycle_id: integral(Column::CycleNumber, values[0], record_no)?,
                step_index: integral(Column::StepIndex, values[1], record_no)?,
                frequency: values[2],
                impedance_real: values[3],
                impedance_imag: values[4],
                current: values[5],
                step_duration: values[6],
                cumulative_charge: values[7],
                cumulative_discharge: values[8],
                charge_energy: values[9],
                discharge_energy: values[10],
                efficiency_pct: values[11],
                capacity: values[12],
            };

            if self.config.exclude_conditioning_cycle && row.cycle_id == 0 {
                conditioning += 1;
                continue;
            }
            rows.push(row);
        }

        debug!(
            "Dropped {} incomplete rows, {} conditioning rows",
            incomplete, conditioning
        );
        info!("Loaded {} measurement rows", rows.len());
        Ok(rows)
    }
}

/// Parse every required column; `None` when any value is missing
fn read_values(
    record: &StringRecord,
    index: &ColumnIndex,
    record_no: u64,
) -> Result<Option<[f64; REQUIRED_COLUMNS.len()]>, TableError> {
    let mut values = [0.0; REQUIRED_COLUMNS.len()];
    for column in REQUIRED_COLUMNS {
        let text = record.get(index.position(column)).unwrap_or("").trim();
        if text.is_empty() {
            return Ok(None);
        }
        let value: f64 = text.parse().map_err(|_| TableError::Unparseable {
            column: column.header(),
            text: text.to_string(),
            record: record_no,
        })?;
        if value.is_nan() {
            return Ok(None);
        }
        values[column.ordinal()] = value;
    }
    Ok(Some(values))
}

/// Integer columns are often exported as floats ("3.0")
fn integral(column: Column, value: f64, record_no: u64) -> Result<i64, TableError> {
    if !value.is_finite() || value.fract() != 0.0 {
        return Err(TableError::InvalidValue {
            column: column.header(),
            value,
            record: record_no,
        });
    }
    Ok(value as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "cycle number,Ns,freq/Hz,Re(Z)/Ohm,Im(Z)/Ohm,I/mA,step time/s,\
Q charge/mA.h,Q discharge/mA.h,Energy charge/W.h,Energy discharge/W.h,Efficiency/%,Capacity/mA.h";

    fn table(body: &str) -> String {
        format!("{}\n{}", HEADER, body)
    }

    #[test]
    fn test_load_rows() {
        let csv = table(
            "1,1,10.0,0.05,-0.01,0,0,0,0,0,0,99.5,50\n\
             1.0,2,0,0,0,100.0,30,1.5,0,0.4,0,99.5,50\n",
        );
        let rows = TableLoader::default().load_reader(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].cycle_id, 1);
        assert_eq!(rows[0].step_index, 1);
        assert!((rows[0].impedance_imag + 0.01).abs() < 1e-12);
        assert!(rows[1].is_charging());
        assert_eq!(rows[1].step_duration, 30.0);
    }

    #[test]
    fn test_drops_incomplete_rows() {
        let csv = table(
            "1,1,10.0,0.05,,0,0,0,0,0,0,99.5,50\n\
             1,1,20.0,0.05,NaN,0,0,0,0,0,0,99.5,50\n\
             1,1,30.0,0.05,-0.02,0,0,0,0,0,0,99.5,50\n",
        );
        let rows = TableLoader::default().load_reader(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].frequency, 30.0);
    }

    #[test]
    fn test_excludes_conditioning_cycle() {
        let csv = table(
            "0,1,10.0,0.05,-0.01,0,0,0,0,0,0,99.5,50\n\
             2,1,10.0,0.05,-0.01,0,0,0,0,0,0,99.5,50\n",
        );
        let rows = TableLoader::default().load_reader(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].cycle_id, 2);

        let keep_all = TableLoader::new(LoaderConfig {
            exclude_conditioning_cycle: false,
            ..Default::default()
        });
        let rows = keep_all.load_reader(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_repairs_imaginary_header() {
        let csv = table("1,1,10.0,0.05,-0.01,0,0,0,0,0,0,99.5,50\n")
            .replacen("Im(Z)/Ohm", "#NAME?", 1);
        let rows = TableLoader::default().load_reader(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert!((rows[0].impedance_imag + 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_missing_column_rejected() {
        let csv = table("1,1,10.0,0.05,-0.01,0,0,0,0,0,0,99.5,50\n")
            .replacen("Capacity/mA.h", "Cap", 1);
        let err = TableLoader::default().load_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, TableError::MissingColumn("Capacity/mA.h")));
    }

    #[test]
    fn test_fractional_cycle_rejected() {
        let csv = table("1.5,1,10.0,0.05,-0.01,0,0,0,0,0,0,99.5,50\n");
        let err = TableLoader::default().load_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, TableError::InvalidValue { .. }));
    }

    #[test]
    fn test_unparseable_field_rejected() {
        let csv = table("1,1,ten,0.05,-0.01,0,0,0,0,0,0,99.5,50\n");
        let err = TableLoader::default().load_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, TableError::Unparseable { .. }));
    }

    #[test]
    fn test_semicolon_delimiter() {
        let csv = table("1,1,10.0,0.05,-0.01,0,0,0,0,0,0,99.5,50\n").replace(',', ";");
        let loader = TableLoader::new(LoaderConfig {
            delimiter: ';',
            ..Default::default()
        });
        assert_eq!(loader.load_reader(csv.as_bytes()).unwrap().len(), 1);
    }
}
