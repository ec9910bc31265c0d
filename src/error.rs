//! Error types for the aggregation engine and the data loader.

use chrono::NaiveDate;
use std::path::PathBuf;

/// Errors returned by [`crate::analysis::compute`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("Invalid metric '{0}' (expected 'quantity' or 'total_value')")]
    InvalidMetric(String),

    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("Overflow while summing {0}")]
    Overflow(&'static str),
}

/// Why a single CSV row was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RowError {
    #[error("CSV parse error: {0}")]
    Malformed(String),

    #[error("missing value for '{0}'")]
    MissingValue(&'static str),

    #[error("invalid date '{text}' (format {format})")]
    InvalidDate { text: String, format: String },

    #[error("invalid number '{text}' for '{column}'")]
    InvalidNumber { column: &'static str, text: String },

    #[error("negative value '{text}' for '{column}'")]
    NegativeValue { column: &'static str, text: String },
}

/// Errors raised while turning CSV files into a dataset.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{path}: missing required column '{column}'")]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("{path}:{line}: {source}")]
    InvalidRow {
        path: PathBuf,
        line: u64,
        #[source]
        source: RowError,
    },

    #[error("No data files found under {0}")]
    NoInputFiles(PathBuf),
}
