// src/handlers/auth.rs

use axum::{Json, extract::State, response::IntoResponse};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::{envelope::ApiResponse, error::AppError},
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::auth::{LoginPayload, Portal, User},
};

// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Session created; cookie set"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let issued = app_state
        .auth_service
        .login(&payload.username, &payload.password, payload.portal)
        .await?;

    let cookie = Cookie::build((payload.portal.cookie_name(), issued.raw_token))
        .path("/")
        .http_only(true)
        .build();

    Ok((
        jar.add(cookie),
        Json(ApiResponse::ok("Logged in.", issued.user)),
    ))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogoutPayload {
    pub portal: Portal,
}

// POST /api/auth/logout
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    request_body = LogoutPayload,
    responses((status = 200, description = "Session removed; cookie cleared"))
)]
pub async fn logout(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LogoutPayload>,
) -> Result<impl IntoResponse, AppError> {
    let cookie_name = payload.portal.cookie_name();

    if let Some(cookie) = jar.get(cookie_name) {
        app_state.auth_service.logout(cookie.value()).await?;
    }

    let jar = jar.remove(Cookie::build((cookie_name, "")).path("/").build());

    Ok((jar, Json(ApiResponse::ok_empty("Logged out."))))
}

// GET /api/auth/me
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "The authenticated user", body = User),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(auth: AuthenticatedUser) -> Json<ApiResponse<User>> {
    Json(ApiResponse::ok("OK", auth.user().clone()))
}
