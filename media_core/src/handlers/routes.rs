//! Route registrar: binds paths to controllers and attaches the
//! bearer gate to every mutating or operator-facing route.

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

use crate::handlers::{diagnostics, health, media};
use crate::middleware::auth::require_auth;
use crate::AppState;

pub fn create_routes(state: AppState) -> Router<AppState> {
    let gated = Router::new()
        .route("/api/imagekit/upload", post(media::handle_upload))
        .route("/api/imagekit/file", delete(media::handle_delete_missing_id))
        .route("/api/imagekit/file/:file_id", delete(media::handle_delete))
        .route("/api/diagnostics/ping", get(diagnostics::handle_ping))
        .route("/api/diagnostics/counts", get(diagnostics::handle_counts))
        .route_layer(middleware::from_fn_with_state(state, require_auth));

    Router::new()
        .route("/api/imagekit/auth", get(media::handle_auth_params))
        .route("/health", get(health::handle_health))
        .route("/live", get(health::handle_liveness))
        .route("/ready", get(health::handle_readiness))
        .merge(gated)
}
