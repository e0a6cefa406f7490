// src/handlers/repairs.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        envelope::{ApiResponse, Page, PageQuery},
        error::AppError,
    },
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        auth::Capability,
        repair::{IntakeType, Repair, RepairStatus, RepairSummary},
    },
    services::repair::{CreateRepairInput, CreateRepairItemInput, RepairDetail, ReminderOutcome},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RepairItemPayload {
    pub repair_type_id: Uuid,
    pub price: Option<Decimal>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRepairPayload {
    #[validate(length(min = 1, message = "is required"))]
    #[schema(example = "B-1042")]
    pub bill_no: String,

    pub client_id: Uuid,
    pub brand_id: Uuid,
    pub store_id: Uuid,

    #[schema(example = "Walk-in")]
    pub intake_type: IntakeType,

    #[schema(example = 6500)]
    pub total_amount: Decimal,

    #[schema(example = 2500)]
    pub advance_amount: Decimal,

    /// Calendar date, `YYYY-MM-DD`.
    #[schema(example = "2026-02-18")]
    pub estimated_delivery_date: String,

    pub description: Option<String>,

    #[serde(default)]
    pub items: Vec<RepairItemPayload>,
}

// POST /api/repairs
#[utoipa::path(
    post,
    path = "/api/repairs",
    tag = "Repairs",
    request_body = CreateRepairPayload,
    responses(
        (status = 201, description = "Repair created", body = Repair),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Bill number already in use")
    )
)]
pub async fn create_repair(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Json(payload): Json<CreateRepairPayload>,
) -> Result<impl IntoResponse, AppError> {
    let user = auth.require(Capability::Repairs)?;
    payload.validate()?;

    let repair = app_state
        .repair_service
        .create(
            CreateRepairInput {
                bill_no: payload.bill_no,
                client_id: payload.client_id,
                brand_id: payload.brand_id,
                store_id: payload.store_id,
                intake_type: payload.intake_type,
                total_amount: payload.total_amount,
                advance_amount: payload.advance_amount,
                estimated_delivery_date: payload.estimated_delivery_date,
                description: payload.description,
                items: payload
                    .items
                    .into_iter()
                    .map(|item| CreateRepairItemInput {
                        repair_type_id: item.repair_type_id,
                        price: item.price,
                    })
                    .collect(),
            },
            user,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok("Repair created.", repair))))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListRepairsQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub q: Option<String>,
    pub status: Option<RepairStatus>,
}

// GET /api/repairs
#[utoipa::path(
    get,
    path = "/api/repairs",
    tag = "Repairs",
    responses((status = 200, description = "Paged repairs", body = Page<RepairSummary>))
)]
pub async fn list_repairs(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Query(query): Query<ListRepairsQuery>,
) -> Result<impl IntoResponse, AppError> {
    auth.require(Capability::Repairs)?;

    let page = PageQuery { page: query.page, per_page: query.per_page, q: query.q };
    let (items, total) = app_state
        .repair_service
        .list(query.status, page.q.as_deref(), page.limit(), page.offset())
        .await?;

    Ok(Json(ApiResponse::ok("OK", Page::new(items, &page, total))))
}

// GET /api/repairs/{id}
#[utoipa::path(
    get,
    path = "/api/repairs/{id}",
    tag = "Repairs",
    responses(
        (status = 200, description = "Repair with items and audit trail", body = RepairDetail),
        (status = 404, description = "Repair not found")
    )
)]
pub async fn get_repair(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    auth.require(Capability::Repairs)?;
    let detail = app_state.repair_service.detail(id).await?;
    Ok(Json(ApiResponse::ok("OK", detail)))
}

/// Exactly one of the three fields must be supplied: a status advance, a new
/// delivery date, or a bare postponed-flag change.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRepairPayload {
    pub status: Option<RepairStatus>,
    #[schema(example = "2026-02-20")]
    pub estimated_delivery_date: Option<String>,
    pub is_postponed: Option<bool>,
}

// PATCH /api/repairs/{id}
#[utoipa::path(
    patch,
    path = "/api/repairs/{id}",
    tag = "Repairs",
    request_body = UpdateRepairPayload,
    responses(
        (status = 200, description = "Repair updated", body = Repair),
        (status = 400, description = "Invalid transition or input"),
        (status = 404, description = "Repair not found")
    )
)]
pub async fn update_repair(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRepairPayload>,
) -> Result<impl IntoResponse, AppError> {
    let user = auth.require(Capability::Repairs)?;

    let supplied = [
        payload.status.is_some(),
        payload.estimated_delivery_date.is_some(),
        payload.is_postponed.is_some(),
    ]
    .iter()
    .filter(|present| **present)
    .count();

    if supplied > 1 {
        return Err(AppError::Validation(
            "Supply exactly one of status, estimatedDeliveryDate or isPostponed.".into(),
        ));
    }

    let repair = if let Some(status) = payload.status {
        app_state.repair_service.advance_status(id, status, user).await?
    } else {
        app_state
            .repair_service
            .reschedule(
                id,
                payload.estimated_delivery_date.as_deref(),
                payload.is_postponed,
                user,
            )
            .await?
    };

    Ok(Json(ApiResponse::ok("Repair updated.", repair)))
}

// DELETE /api/repairs/{id}
#[utoipa::path(
    delete,
    path = "/api/repairs/{id}",
    tag = "Repairs",
    responses(
        (status = 200, description = "Repair deleted"),
        (status = 403, description = "Not a super admin"),
        (status = 404, description = "Repair not found")
    )
)]
pub async fn delete_repair(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.repair_service.delete(id, auth.user()).await?;
    Ok(Json(ApiResponse::ok_empty("Repair deleted.")))
}

// POST /api/repairs/{id}/reminder
#[utoipa::path(
    post,
    path = "/api/repairs/{id}/reminder",
    tag = "Repairs",
    responses(
        (status = 200, description = "Reminder dispatched (or already sent)", body = ReminderOutcome),
        (status = 404, description = "Repair not found"),
        (status = 422, description = "No tracking token recoverable"),
        (status = 502, description = "SMS gateway failure")
    )
)]
pub async fn send_delivery_reminder(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let user = auth.require(Capability::Repairs)?;

    let outcome = app_state
        .repair_service
        .request_delivery_reminder(id, user)
        .await?;

    let message = if outcome.already_sent {
        "A delivery reminder was already sent for this repair."
    } else {
        "Delivery reminder sent."
    };

    Ok(Json(ApiResponse::ok(message, outcome)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_payload_field_exclusivity_counting() {
        let payload: UpdateRepairPayload =
            serde_json::from_str(r#"{"status":"PROCESSING","isPostponed":true}"#).unwrap();
        let supplied = [
            payload.status.is_some(),
            payload.estimated_delivery_date.is_some(),
            payload.is_postponed.is_some(),
        ]
        .iter()
        .filter(|p| **p)
        .count();
        assert_eq!(supplied, 2);
    }

    #[test]
    fn create_payload_accepts_form_intake_labels() {
        let payload: CreateRepairPayload = serde_json::from_str(
            r#"{
                "billNo": "B-1042",
                "clientId": "550e8400-e29b-41d4-a716-446655440000",
                "brandId": "550e8400-e29b-41d4-a716-446655440001",
                "storeId": "550e8400-e29b-41d4-a716-446655440002",
                "intakeType": "Walk-in",
                "totalAmount": 6500,
                "advanceAmount": 2500,
                "estimatedDeliveryDate": "2026-02-18"
            }"#,
        )
        .unwrap();
        assert_eq!(payload.intake_type, IntakeType::WalkIn);
        assert!(payload.items.is_empty());
    }
}
