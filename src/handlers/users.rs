// src/handlers/users.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{envelope::ApiResponse, error::AppError},
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::auth::{Capability, CreateUserPayload, UpdateUserPayload, User},
};

// POST /api/users
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "Users",
    request_body = CreateUserPayload,
    responses(
        (status = 201, description = "Staff account created", body = User),
        (status = 409, description = "Username taken")
    )
)]
pub async fn create_user(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Json(payload): Json<CreateUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    auth.require(Capability::Users)?;
    payload.validate()?;

    let user = app_state
        .auth_service
        .create_user(
            &payload.username,
            &payload.full_name,
            payload.mobile.as_deref(),
            &payload.password,
            payload.role,
            payload.system,
            &payload.capabilities,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok("User created.", user))))
}

// GET /api/users
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    responses((status = 200, description = "All staff accounts", body = Vec<User>))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    auth.require(Capability::Users)?;
    let users = app_state.auth_service.list_users().await?;
    Ok(Json(ApiResponse::ok("OK", users)))
}

// PATCH /api/users/{id}
#[utoipa::path(
    patch,
    path = "/api/users/{id}",
    tag = "Users",
    request_body = UpdateUserPayload,
    responses(
        (status = 200, description = "Staff account updated", body = User),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    auth.require(Capability::Users)?;
    payload.validate()?;

    let user = app_state
        .auth_service
        .update_user(
            id,
            payload.full_name.as_deref(),
            payload.mobile.as_deref(),
            payload.role,
            payload.system,
            payload.capabilities.as_deref(),
            payload.is_active,
            payload.password.as_deref(),
        )
        .await?;

    Ok(Json(ApiResponse::ok("User updated.", user)))
}
