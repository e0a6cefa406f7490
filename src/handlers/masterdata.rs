// src/handlers/masterdata.rs
//
// CRUD over the four master-data registries. Clients and brands carry their
// own capability; stores and repair types sit under SETTINGS.

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
        masterdata::{Brand, Client, RepairType, Store},
    },
};

// =============================================================================
//  CLIENTS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientPayload {
    #[validate(length(min = 1, message = "is required"))]
    #[schema(example = "Nuwan Silva")]
    pub full_name: String,

    #[validate(length(min = 7, message = "must be a valid mobile number"))]
    #[schema(example = "0771234567")]
    pub mobile: String,

    #[validate(email(message = "must be a valid e-mail"))]
    pub email: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClientPayload {
    pub full_name: Option<String>,
    #[validate(length(min = 7, message = "must be a valid mobile number"))]
    pub mobile: Option<String>,
    #[validate(email(message = "must be a valid e-mail"))]
    pub email: Option<String>,
    pub address: Option<String>,
}

// POST /api/clients
#[utoipa::path(
    post,
    path = "/api/clients",
    tag = "Master Data",
    request_body = CreateClientPayload,
    responses(
        (status = 201, description = "Client created", body = Client),
        (status = 409, description = "Mobile number already registered")
    )
)]
pub async fn create_client(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Json(payload): Json<CreateClientPayload>,
) -> Result<impl IntoResponse, AppError> {
    auth.require(Capability::Clients)?;
    payload.validate()?;

    let client = app_state
        .masterdata_service
        .create_client(
            &payload.full_name,
            &payload.mobile,
            payload.email.as_deref(),
            payload.address.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok("Client created.", client))))
}

// GET /api/clients
#[utoipa::path(
    get,
    path = "/api/clients",
    tag = "Master Data",
    responses((status = 200, description = "Paged clients", body = Page<Client>))
)]
pub async fn list_clients(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Query(page): Query<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    auth.require(Capability::Clients)?;

    let (items, total) = app_state
        .masterdata_service
        .list_clients(page.q.as_deref(), page.limit(), page.offset())
        .await?;

    Ok(Json(ApiResponse::ok("OK", Page::new(items, &page, total))))
}

// GET /api/clients/{id}
#[utoipa::path(
    get,
    path = "/api/clients/{id}",
    tag = "Master Data",
    responses(
        (status = 200, description = "The client", body = Client),
        (status = 404, description = "Client not found")
    )
)]
pub async fn get_client(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    auth.require(Capability::Clients)?;
    let client = app_state.masterdata_service.get_client(id).await?;
    Ok(Json(ApiResponse::ok("OK", client)))
}

// PATCH /api/clients/{id}
#[utoipa::path(
    patch,
    path = "/api/clients/{id}",
    tag = "Master Data",
    request_body = UpdateClientPayload,
    responses((status = 200, description = "Client updated", body = Client))
)]
pub async fn update_client(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateClientPayload>,
) -> Result<impl IntoResponse, AppError> {
    auth.require(Capability::Clients)?;
    payload.validate()?;

    let client = app_state
        .masterdata_service
        .update_client(
            id,
            payload.full_name.as_deref(),
            payload.mobile.as_deref(),
            payload.email.as_deref(),
            payload.address.as_deref(),
        )
        .await?;

    Ok(Json(ApiResponse::ok("Client updated.", client)))
}

// DELETE /api/clients/{id}
#[utoipa::path(
    delete,
    path = "/api/clients/{id}",
    tag = "Master Data",
    responses((status = 200, description = "Client deleted"))
)]
pub async fn delete_client(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    auth.require(Capability::Clients)?;
    app_state.masterdata_service.delete_client(id).await?;
    Ok(Json(ApiResponse::ok_empty("Client deleted.")))
}

// =============================================================================
//  BRANDS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BrandPayload {
    #[validate(length(min = 1, message = "is required"))]
    #[schema(example = "Gray-Nicolls")]
    pub name: String,
}

// POST /api/brands
#[utoipa::path(
    post,
    path = "/api/brands",
    tag = "Master Data",
    request_body = BrandPayload,
    responses(
        (status = 201, description = "Brand created", body = Brand),
        (status = 409, description = "Brand name already exists")
    )
)]
pub async fn create_brand(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Json(payload): Json<BrandPayload>,
) -> Result<impl IntoResponse, AppError> {
    auth.require(Capability::Brands)?;
    payload.validate()?;
    let brand = app_state.masterdata_service.create_brand(&payload.name).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok("Brand created.", brand))))
}

// GET /api/brands
#[utoipa::path(
    get,
    path = "/api/brands",
    tag = "Master Data",
    responses((status = 200, description = "Paged brands", body = Page<Brand>))
)]
pub async fn list_brands(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Query(page): Query<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    auth.require(Capability::Brands)?;

    let (items, total) = app_state
        .masterdata_service
        .list_brands(page.q.as_deref(), page.limit(), page.offset())
        .await?;

    Ok(Json(ApiResponse::ok("OK", Page::new(items, &page, total))))
}

// PATCH /api/brands/{id}
#[utoipa::path(
    patch,
    path = "/api/brands/{id}",
    tag = "Master Data",
    request_body = BrandPayload,
    responses((status = 200, description = "Brand updated", body = Brand))
)]
pub async fn update_brand(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<BrandPayload>,
) -> Result<impl IntoResponse, AppError> {
    auth.require(Capability::Brands)?;
    payload.validate()?;
    let brand = app_state.masterdata_service.update_brand(id, &payload.name).await?;
    Ok(Json(ApiResponse::ok("Brand updated.", brand)))
}

// DELETE /api/brands/{id}
#[utoipa::path(
    delete,
    path = "/api/brands/{id}",
    tag = "Master Data",
    responses((status = 200, description = "Brand deleted"))
)]
pub async fn delete_brand(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    auth.require(Capability::Brands)?;
    app_state.masterdata_service.delete_brand(id).await?;
    Ok(Json(ApiResponse::ok_empty("Brand deleted.")))
}

// =============================================================================
//  STORES
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateStorePayload {
    #[validate(length(min = 1, message = "is required"))]
    #[schema(example = "Kandy Branch")]
    pub name: String,

    #[validate(length(min = 1, message = "is required"))]
    #[schema(example = "KDY")]
    pub code: String,

    pub address: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStorePayload {
    pub name: Option<String>,
    pub code: Option<String>,
    pub address: Option<String>,
}

// POST /api/stores
#[utoipa::path(
    post,
    path = "/api/stores",
    tag = "Master Data",
    request_body = CreateStorePayload,
    responses(
        (status = 201, description = "Store created", body = Store),
        (status = 409, description = "Store code already exists")
    )
)]
pub async fn create_store(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Json(payload): Json<CreateStorePayload>,
) -> Result<impl IntoResponse, AppError> {
    auth.require(Capability::Settings)?;
    payload.validate()?;

    let store = app_state
        .masterdata_service
        .create_store(&payload.name, &payload.code, payload.address.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok("Store created.", store))))
}

// GET /api/stores
#[utoipa::path(
    get,
    path = "/api/stores",
    tag = "Master Data",
    responses((status = 200, description = "Paged stores", body = Page<Store>))
)]
pub async fn list_stores(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Query(page): Query<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    auth.require(Capability::Settings)?;

    let (items, total) = app_state
        .masterdata_service
        .list_stores(page.q.as_deref(), page.limit(), page.offset())
        .await?;

    Ok(Json(ApiResponse::ok("OK", Page::new(items, &page, total))))
}

// PATCH /api/stores/{id}
#[utoipa::path(
    patch,
    path = "/api/stores/{id}",
    tag = "Master Data",
    request_body = UpdateStorePayload,
    responses((status = 200, description = "Store updated", body = Store))
)]
pub async fn update_store(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStorePayload>,
) -> Result<impl IntoResponse, AppError> {
    auth.require(Capability::Settings)?;
    payload.validate()?;

    let store = app_state
        .masterdata_service
        .update_store(
            id,
            payload.name.as_deref(),
            payload.code.as_deref(),
            payload.address.as_deref(),
        )
        .await?;

    Ok(Json(ApiResponse::ok("Store updated.", store)))
}

// DELETE /api/stores/{id}
#[utoipa::path(
    delete,
    path = "/api/stores/{id}",
    tag = "Master Data",
    responses((status = 200, description = "Store deleted"))
)]
pub async fn delete_store(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    auth.require(Capability::Settings)?;
    app_state.masterdata_service.delete_store(id).await?;
    Ok(Json(ApiResponse::ok_empty("Store deleted.")))
}

// =============================================================================
//  REPAIR TYPES
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRepairTypePayload {
    #[validate(length(min = 1, message = "is required"))]
    #[schema(example = "Handle replacement")]
    pub name: String,

    #[validate(length(min = 1, message = "is required"))]
    #[schema(example = "HDL")]
    pub code: String,

    #[schema(example = 3500)]
    pub default_price: Option<Decimal>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRepairTypePayload {
    pub name: Option<String>,
    pub code: Option<String>,
    pub default_price: Option<Decimal>,
}

// POST /api/repair-types
#[utoipa::path(
    post,
    path = "/api/repair-types",
    tag = "Master Data",
    request_body = CreateRepairTypePayload,
    responses(
        (status = 201, description = "Repair type created", body = RepairType),
        (status = 409, description = "Repair type code already exists")
    )
)]
pub async fn create_repair_type(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Json(payload): Json<CreateRepairTypePayload>,
) -> Result<impl IntoResponse, AppError> {
    auth.require(Capability::Settings)?;
    payload.validate()?;

    let repair_type = app_state
        .masterdata_service
        .create_repair_type(&payload.name, &payload.code, payload.default_price)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Repair type created.", repair_type)),
    ))
}

// GET /api/repair-types
#[utoipa::path(
    get,
    path = "/api/repair-types",
    tag = "Master Data",
    responses((status = 200, description = "Paged repair types", body = Page<RepairType>))
)]
pub async fn list_repair_types(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Query(page): Query<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    auth.require(Capability::Settings)?;

    let (items, total) = app_state
        .masterdata_service
        .list_repair_types(page.q.as_deref(), page.limit(), page.offset())
        .await?;

    Ok(Json(ApiResponse::ok("OK", Page::new(items, &page, total))))
}

// PATCH /api/repair-types/{id}
#[utoipa::path(
    patch,
    path = "/api/repair-types/{id}",
    tag = "Master Data",
    request_body = UpdateRepairTypePayload,
    responses((status = 200, description = "Repair type updated", body = RepairType))
)]
pub async fn update_repair_type(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRepairTypePayload>,
) -> Result<impl IntoResponse, AppError> {
    auth.require(Capability::Settings)?;
    payload.validate()?;

    let repair_type = app_state
        .masterdata_service
        .update_repair_type(
            id,
            payload.name.as_deref(),
            payload.code.as_deref(),
            payload.default_price,
        )
        .await?;

    Ok(Json(ApiResponse::ok("Repair type updated.", repair_type)))
}

// DELETE /api/repair-types/{id}
#[utoipa::path(
    delete,
    path = "/api/repair-types/{id}",
    tag = "Master Data",
    responses((status = 200, description = "Repair type deleted"))
)]
pub async fn delete_repair_type(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    auth.require(Capability::Settings)?;
    app_state.masterdata_service.delete_repair_type(id).await?;
    Ok(Json(ApiResponse::ok_empty("Repair type deleted.")))
}
