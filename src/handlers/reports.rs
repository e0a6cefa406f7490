// src/handlers/reports.rs

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    common::{envelope::ApiResponse, error::AppError},
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{auth::Capability, reporting::IncomeReport},
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IncomeReportQuery {
    /// Inclusive creation-date window start, `YYYY-MM-DD`.
    pub from: Option<NaiveDate>,
    /// Inclusive creation-date window end, `YYYY-MM-DD`.
    pub to: Option<NaiveDate>,
}

// GET /accounting-api/reports/income
#[utoipa::path(
    get,
    path = "/accounting-api/reports/income",
    tag = "Reports",
    responses((status = 200, description = "Income rows and summary", body = IncomeReport))
)]
pub async fn income_report(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Query(query): Query<IncomeReportQuery>,
) -> Result<impl IntoResponse, AppError> {
    auth.require(Capability::Dashboard)?;

    let report = app_state
        .reporting_service
        .income_report(query.from, query.to)
        .await?;

    Ok(Json(ApiResponse::ok("OK", report)))
}
