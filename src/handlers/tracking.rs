// src/handlers/tracking.rs
//
// The public, unauthenticated tracking lookup. Read-only; the NOT_FOUND
// wording never confirms whether a token ever existed.

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::{
    common::{envelope::ApiResponse, error::AppError},
    config::AppState,
    models::repair::TrackingProjection,
};

// GET /api/track/{token}
#[utoipa::path(
    get,
    path = "/api/track/{token}",
    tag = "Tracking",
    responses(
        (status = 200, description = "Current repair status", body = TrackingProjection),
        (status = 404, description = "No access or invalid tracking id"),
        (status = 410, description = "Tracking disabled after delivery")
    )
)]
pub async fn track_repair(
    State(app_state): State<AppState>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let projection = app_state.repair_service.track(&token).await?;
    Ok(Json(ApiResponse::ok("OK", projection)))
}
