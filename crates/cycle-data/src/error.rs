//! Table Loading Error Types

use thiserror::Error;

/// Errors while reading a cycling table
#[derive(Debug, Error)]
pub enum TableError {
    /// Required column absent after header repair
    #[error("Missing required column: {0}")]
    MissingColumn(&'static str),

    /// Value that cannot be used for its column
    #[error("Invalid value {value} in column {column} at record {record}")]
    InvalidValue {
        column: &'static str,
        value: f64,
        record: u64,
    },

    /// Field that is not a number
    #[error("Unparseable field {text:?} in column {column} at record {record}")]
    Unparseable {
        column: &'static str,
        text: String,
        record: u64,
    },

    /// Malformed CSV
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// File could not be opened
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
