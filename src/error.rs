use crate::table::SourceKind;
use std::fmt;
use thiserror::Error;

/// The three columns an orders table must expose before anything can be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderField {
    Status,
    Amount,
    Product,
}

impl fmt::Display for OrderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OrderField::Status => "order status",
            OrderField::Amount => "order amount",
            OrderField::Product => "product name",
        };
        f.write_str(label)
    }
}

#[derive(Error, Debug)]
pub enum ProfitError {
    #[error("{table} table has no column for {field}")]
    MissingColumn { table: SourceKind, field: OrderField },

    #[error("{0} table is required but was not provided or is empty")]
    MissingSource(SourceKind),

    #[error("Could not read '{path}': {reason}")]
    SourceRead { path: String, reason: String },

    #[error("Column '{column}' row {row}: cannot parse '{value}' as an amount")]
    Normalization {
        column: String,
        row: usize,
        value: String,
    },

    #[error("Unit cost for '{product}' must be a finite number, got {value}")]
    InvalidUnitCost { product: String, value: f64 },

    #[error("Metrics invariant violated for {field}: expected {expected}, got {actual}")]
    MetricsInvariantViolation {
        field: String,
        expected: f64,
        actual: f64,
    },

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ProfitError>;
