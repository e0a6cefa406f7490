// src/handlers/sms.rs

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    common::{
        envelope::{ApiResponse, Page, PageQuery},
        error::AppError,
    },
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        auth::Capability,
        sms::{SmsOutbox, SmsStatus},
    },
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListSmsQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub status: Option<SmsStatus>,
}

// GET /api/sms
#[utoipa::path(
    get,
    path = "/api/sms",
    tag = "SMS",
    responses((status = 200, description = "Paged outbox rows", body = Page<SmsOutbox>))
)]
pub async fn list_sms(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Query(query): Query<ListSmsQuery>,
) -> Result<impl IntoResponse, AppError> {
    auth.require(Capability::Sms)?;

    let page = PageQuery { page: query.page, per_page: query.per_page, q: None };
    let (rows, total) = app_state
        .outbox_repo
        .list(query.status, page.limit(), page.offset())
        .await?;

    Ok(Json(ApiResponse::ok("OK", Page::new(rows, &page, total))))
}
