//! Health and probe handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::time::Instant;

use crate::models::ApiResponse;
use crate::AppState;

pub async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    let start = Instant::now();
    let database_healthy = state.db.health_check().await.is_ok();
    let db_latency_ms = start.elapsed().as_millis() as u64;

    let status = if database_healthy { "healthy" } else { "unhealthy" };
    let status_code = if database_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let body = serde_json::json!({
        "status": status,
        "version": state.version,
        "timestamp": chrono::Utc::now().timestamp(),
        "database": {
            "healthy": database_healthy,
            "latency_ms": db_latency_ms,
        },
        "keep_alive_running": state.keep_alive.is_running(),
    });

    (status_code, Json(ApiResponse::success(body)))
}

pub async fn handle_liveness() -> impl IntoResponse {
    Json(ApiResponse::success(serde_json::json!({
        "status": "alive",
        "timestamp": chrono::Utc::now().timestamp(),
    })))
}

pub async fn handle_readiness(State(state): State<AppState>) -> impl IntoResponse {
    if state.db.health_check().await.is_ok() {
        (
            StatusCode::OK,
            Json(ApiResponse::success(serde_json::json!({
                "status": "ready",
                "timestamp": chrono::Utc::now().timestamp(),
            }))),
        )
            .into_response()
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({
                "success": false,
                "error": "Service not ready: database unavailable",
            })),
        )
            .into_response()
    }
}
