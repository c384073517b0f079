use polars::prelude::PolarsError;
use thiserror::Error;
use time::Date;

/// Errors raised while turning a CSV source into a `PriceSeries`.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be read or tokenized as CSV.
    #[error("Polars operation failed: {0}")]
    Polars(#[from] PolarsError),

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Row {row}: malformed date {value:?}")]
    MalformedDate { row: usize, value: String },

    #[error("Row {row}: non-numeric value {value:?} in column {column}")]
    MalformedNumber {
        row: usize,
        column: &'static str,
        value: String,
    },

    /// Rows of a downloaded file are passed through as-is and must already ascend.
    #[error("Row {row}: date {date} does not follow the previous row")]
    Unordered { row: usize, date: Date },

    #[error("Duplicate date: {0}")]
    DuplicateDate(Date),
}

/// Errors raised by the DCA simulation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// Bad simulation parameters (non-positive amount, empty series).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A price the amount would be divided by is zero, negative or not finite.
    #[error("Cannot divide by open price {open} at ordinal {ordinal} ({date})")]
    Division { ordinal: usize, date: Date, open: f64 },
}

/// Errors raised while assembling a multi-series comparison.
#[derive(Debug, Error)]
pub enum ComparisonError {
    #[error("Nothing to compare: the series list is empty")]
    Empty,

    /// A single series failed, which fails the whole comparison.
    #[error("Series {name}: {source}")]
    Series {
        name: String,
        #[source]
        source: SimulationError,
    },

    /// The uninvested-cash reference only holds for series sharing the first axis.
    #[error("Series {name} does not share the date axis of {base} ({len} vs {base_len} records)")]
    AxisMismatch {
        name: String,
        base: String,
        len: usize,
        base_len: usize,
    },
}

/// Errors raised while reading a `ComparatorConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// The unified error type for the `dca_backtester` crate.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("Simulation error: {0}")]
    Simulation(#[from] SimulationError),

    #[error("Comparison error: {0}")]
    Comparison(#[from] ComparisonError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Polars operation failed: {0}")]
    Polars(#[from] PolarsError),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
