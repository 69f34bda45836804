//! Operational diagnostics: the manually triggered keep-alive ping and
//! per-table row counts.

use axum::{extract::State, response::IntoResponse, Json};
use tracing::info;

use crate::error::Result;
use crate::models::ApiResponse;
use crate::AppState;

/// `GET /api/diagnostics/ping` runs one keep-alive probe on demand.
/// Always 200 with the structured report; a failed probe is data, not
/// an error response.
pub async fn handle_ping(State(state): State<AppState>) -> impl IntoResponse {
    let report = state.keep_alive.ping().await;
    info!(
        success = report.success,
        duration_ms = report.duration_ms,
        "Manual keep-alive ping"
    );

    Json(ApiResponse::success(report))
}

/// `GET /api/diagnostics/counts` reports row counts for every user table.
pub async fn handle_counts(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let counts = state.db.table_counts().await?;
    Ok(Json(ApiResponse::success(counts)))
}
