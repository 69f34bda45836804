//! HTTP controllers for the media endpoints

use axum::{
    extract::{Extension, Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tracing::info;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthContext;
use crate::models::{ApiResponse, ClientAuthResponse, Transformation, UploadRequest};
use crate::AppState;

const DEFAULT_UPLOAD_FOLDER: &str = "logos";
const THUMBNAIL_EDGE: u32 = 200;

#[derive(Debug, Deserialize)]
pub struct AuthQuery {
    token: Option<String>,
    expire: Option<i64>,
}

/// `GET /api/imagekit/auth`, public. Hands the client everything it
/// needs for a direct-to-CDN upload; the private key stays behind the
/// gateway boundary.
pub async fn handle_auth_params(
    State(state): State<AppState>,
    Query(params): Query<AuthQuery>,
) -> Result<impl IntoResponse> {
    let auth = state
        .gateway
        .authentication_parameters(params.token, params.expire)?;

    let response = ClientAuthResponse::new(
        auth,
        state.gateway.public_key(),
        state.gateway.url_endpoint(),
    );

    Ok(Json(ApiResponse::success(response)))
}

/// `POST /api/imagekit/upload`, gated. Server-initiated pass-through
/// for batch and admin flows; interactive clients upload directly with
/// signed parameters instead.
pub async fn handle_upload(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<UploadRequest>,
) -> Result<impl IntoResponse> {
    let file = payload.file.as_deref().unwrap_or("").trim();
    let file_name = payload.file_name.as_deref().unwrap_or("").trim();

    match (file.is_empty(), file_name.is_empty()) {
        (true, true) => {
            return Err(AppError::Validation(
                "file and fileName are required".to_string(),
            ))
        }
        (true, false) => return Err(AppError::Validation("file is required".to_string())),
        (false, true) => return Err(AppError::Validation("fileName is required".to_string())),
        (false, false) => {}
    }

    let folder = payload
        .folder
        .as_deref()
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .unwrap_or(DEFAULT_UPLOAD_FOLDER);

    info!(
        subject = %auth.subject,
        file_name,
        folder,
        "POST /api/imagekit/upload"
    );

    let mut result = state
        .gateway
        .upload_file(file, file_name, folder, payload.tags.as_deref())
        .await?;

    // Only trust thumbnail references that point into our own CDN
    // endpoint; otherwise build one from the stored path.
    let trusted = result
        .thumbnail_url
        .as_deref()
        .map(|u| state.gateway.is_valid_url(u))
        .unwrap_or(false);
    if !trusted {
        result.thumbnail_url = Some(state.gateway.transformed_url(
            &result.file_path,
            Some(&Transformation::resize(THUMBNAIL_EDGE, THUMBNAIL_EDGE)),
        ));
    }

    Ok(Json(ApiResponse::success(result)))
}

/// `DELETE /api/imagekit/file/:file_id`, gated.
pub async fn handle_delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(file_id): Path<String>,
) -> Result<impl IntoResponse> {
    let file_id = file_id.trim();
    if file_id.is_empty() {
        return Err(AppError::Validation("fileId is required".to_string()));
    }

    info!(subject = %auth.subject, file_id, "DELETE /api/imagekit/file");

    state.gateway.delete_file(file_id).await?;

    Ok(Json(ApiResponse::<serde_json::Value>::message(
        "File deleted successfully",
    )))
}

/// Answers the id-less delete path so a missing segment reads as a
/// validation failure rather than an unknown route.
pub async fn handle_delete_missing_id() -> Result<impl IntoResponse> {
    Err::<Json<ApiResponse<serde_json::Value>>, _>(AppError::Validation(
        "fileId is required".to_string(),
    ))
}
