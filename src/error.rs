//! Crate-wide error type.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors surfaced by loading, simulating, and reporting a run.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed, unsorted, duplicated, or non-finite input samples.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The series is shorter than one year minus tolerance.
    #[error(
        "price series too short ({rows} rows, need at least {required}); \
         reload clean prices and avoid prior subsetting"
    )]
    InsufficientData { rows: usize, required: usize },

    /// Non-physical or inconsistent parameters.
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Figure rendering failed.
    #[error("chart error: {0}")]
    Chart(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
