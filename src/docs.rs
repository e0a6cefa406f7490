// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};

use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::me,

        // --- Users ---
        handlers::users::create_user,
        handlers::users::list_users,
        handlers::users::update_user,

        // --- Master Data ---
        handlers::masterdata::create_client,
        handlers::masterdata::list_clients,
        handlers::masterdata::get_client,
        handlers::masterdata::update_client,
        handlers::masterdata::delete_client,
        handlers::masterdata::create_brand,
        handlers::masterdata::list_brands,
        handlers::masterdata::update_brand,
        handlers::masterdata::delete_brand,
        handlers::masterdata::create_store,
        handlers::masterdata::list_stores,
        handlers::masterdata::update_store,
        handlers::masterdata::delete_store,
        handlers::masterdata::create_repair_type,
        handlers::masterdata::list_repair_types,
        handlers::masterdata::update_repair_type,
        handlers::masterdata::delete_repair_type,

        // --- Repairs ---
        handlers::repairs::create_repair,
        handlers::repairs::list_repairs,
        handlers::repairs::get_repair,
        handlers::repairs::update_repair,
        handlers::repairs::delete_repair,
        handlers::repairs::send_delivery_reminder,

        // --- Tracking ---
        handlers::tracking::track_repair,

        // --- SMS ---
        handlers::sms::list_sms,

        // --- Reports ---
        handlers::reports::income_report,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::SystemScope,
            models::auth::Portal,
            models::auth::Capability,
            models::auth::User,
            models::auth::LoginPayload,
            models::auth::CreateUserPayload,
            models::auth::UpdateUserPayload,
            handlers::auth::LogoutPayload,

            // --- Master Data ---
            models::masterdata::Client,
            models::masterdata::Brand,
            models::masterdata::Store,
            models::masterdata::RepairType,
            handlers::masterdata::CreateClientPayload,
            handlers::masterdata::UpdateClientPayload,
            handlers::masterdata::BrandPayload,
            handlers::masterdata::CreateStorePayload,
            handlers::masterdata::UpdateStorePayload,
            handlers::masterdata::CreateRepairTypePayload,
            handlers::masterdata::UpdateRepairTypePayload,

            // --- Repairs ---
            models::repair::RepairStatus,
            models::repair::IntakeType,
            models::repair::Repair,
            models::repair::RepairItem,
            models::repair::RepairSummary,
            models::repair::AuditEventType,
            models::repair::RepairAudit,
            models::repair::TrackingItem,
            models::repair::TrackingProjection,
            handlers::repairs::RepairItemPayload,
            handlers::repairs::CreateRepairPayload,
            handlers::repairs::UpdateRepairPayload,
            services::repair::RepairDetail,
            services::repair::ReminderOutcome,

            // --- SMS ---
            models::sms::SmsType,
            models::sms::SmsStatus,
            models::sms::SmsOutbox,

            // --- Reports ---
            models::reporting::IncomeReportRow,
            models::reporting::IncomeReportSummary,
            models::reporting::IncomeReport,
        )
    ),
    tags(
        (name = "Auth", description = "Login, logout and session introspection"),
        (name = "Users", description = "Staff accounts and capability grants"),
        (name = "Master Data", description = "Clients, brands, stores and repair types"),
        (name = "Repairs", description = "Repair lifecycle, audit trail and reminders"),
        (name = "Tracking", description = "Public status lookup by tracking token"),
        (name = "SMS", description = "Outbox inspection"),
        (name = "Reports", description = "Accounting-side income reporting"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "operation_session",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("bw_ops_session"))),
        );
        components.add_security_scheme(
            "accounting_session",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("bw_acct_session"))),
        );
    }
}
