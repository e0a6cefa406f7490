// src/models/sms.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "sms_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SmsType {
    RepairCreated,
    StatusChanged,
    DeliveryReminder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "sms_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SmsStatus {
    Pending,
    Sent,
    Failed,
}

/// Durable outbox row. Enqueued inside the same transaction as the state
/// change it announces; its status is updated best-effort after dispatch.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SmsOutbox {
    pub id: Uuid,
    pub repair_id: Uuid,
    pub recipient: String,
    pub message: String,
    pub sms_type: SmsType,
    pub status: SmsStatus,
    pub scheduled_for: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
    pub provider_response: Option<String>,
    pub created_at: DateTime<Utc>,
}
