//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::AppState;
use super::types::{ErrorResponse, HourlyQuery, SummaryResponse};
use crate::sim::summary::DailyRevenue;
use crate::sim::types::HourlyRecord;

/// `GET /summary` → 200 + `SummaryResponse` JSON
pub async fn get_summary(State(state): State<Arc<AppState>>) -> Json<SummaryResponse> {
    Json(SummaryResponse {
        parameters: state.parameters.clone(),
        summary: state.summary,
        final_soc_mwh: state.final_soc_mwh,
        inverted_bands: state.inverted_bands.clone(),
        hours: state.records.len(),
    })
}

/// Returns hourly records, optionally restricted to an index range.
///
/// `GET /hourly` → every record
/// `GET /hourly?from=N&to=M` → records N through M (inclusive)
/// `GET /hourly?from=10&to=5` → 400 + `ErrorResponse`
pub async fn get_hourly(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HourlyQuery>,
) -> impl IntoResponse {
    let from = query.from.unwrap_or(0);
    let to = query.to.unwrap_or(usize::MAX);

    if from > to {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("`from` ({from}) must be <= `to` ({to})"),
            }),
        ));
    }

    let records: Vec<HourlyRecord> = state
        .records
        .iter()
        .skip(from)
        .take((to - from).saturating_add(1))
        .cloned()
        .collect();

    Ok(Json(records))
}

/// `GET /daily` → 200 + `Vec<DailyRevenue>` JSON
pub async fn get_daily(State(state): State<Arc<AppState>>) -> Json<Vec<DailyRevenue>> {
    Json(state.daily.clone())
}
