//! API response and query types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::sim::dispatch::DispatchParameters;
use crate::sim::summary::SummaryReport;

/// Run overview returned by `GET /summary`.
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub parameters: DispatchParameters,
    /// Rounded summary keyed by its report labels.
    pub summary: SummaryReport,
    pub final_soc_mwh: f64,
    /// Dates with an inverted band; `null` for the global band.
    pub inverted_bands: Vec<Option<NaiveDate>>,
    pub hours: usize,
}

/// Optional index range for the hourly endpoint, both ends inclusive.
#[derive(Debug, Default, Deserialize)]
pub struct HourlyQuery {
    pub from: Option<usize>,
    pub to: Option<usize>,
}

/// Error response body for 400-class errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}
