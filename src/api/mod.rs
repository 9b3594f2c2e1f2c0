//! Read-only REST API over a finished dispatch run.
//!
//! Provides three GET endpoints:
//! - `/summary`: dispatch parameters, rounded summary, final SOC and inverted bands
//! - `/hourly`: hourly records with optional index range filtering
//! - `/daily`: daily net revenue with running total

mod handlers;
mod types;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use chrono::NaiveDate;
use tracing::info;

use crate::runner::BessRun;
use crate::sim::dispatch::DispatchParameters;
use crate::sim::summary::{DailyRevenue, SummaryReport};
use crate::sim::types::HourlyRecord;

pub use types::{ErrorResponse, HourlyQuery, SummaryResponse};

/// Immutable application state shared across all request handlers.
///
/// Built once from a finished run and wrapped in `Arc`; nothing is mutated
/// while serving.
#[derive(Debug, Clone)]
pub struct AppState {
    pub parameters: DispatchParameters,
    pub summary: SummaryReport,
    pub final_soc_mwh: f64,
    /// Days whose price band was inverted; `None` stands for the global band.
    pub inverted_bands: Vec<Option<NaiveDate>>,
    pub records: Vec<HourlyRecord>,
    pub daily: Vec<DailyRevenue>,
}

impl From<BessRun> for AppState {
    fn from(run: BessRun) -> Self {
        let daily = run.daily_revenue();
        Self {
            summary: run.summary.report(),
            parameters: run.parameters,
            final_soc_mwh: run.final_soc_mwh,
            inverted_bands: run.inverted_bands,
            records: run.records,
            daily,
        }
    }
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/summary", get(handlers::get_summary))
        .route("/hourly", get(handlers::get_hourly))
        .route("/daily", get(handlers::get_daily))
        .with_state(state)
}

/// Binds to the given address and serves the API until the server stops.
///
/// # Errors
///
/// Returns an error if the listener cannot bind to `addr` or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    axum::serve(listener, app).await
}
