// src/models/repair.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

// =============================================================================
//  STATUS STATE MACHINE
// =============================================================================

/// Repair lifecycle status. The order of `ORDER` is the state machine:
/// a transition is legal only to the immediate next entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "repair_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RepairStatus {
    Pending,
    Processing,
    RepairCompleted,
    Delivered,
}

impl RepairStatus {
    pub const ORDER: [RepairStatus; 4] = [
        RepairStatus::Pending,
        RepairStatus::Processing,
        RepairStatus::RepairCompleted,
        RepairStatus::Delivered,
    ];

    fn position(self) -> usize {
        Self::ORDER.iter().position(|s| *s == self).unwrap_or(0)
    }

    /// Forward-only, one step at a time, never skipping.
    pub fn can_advance_to(self, requested: RepairStatus) -> bool {
        requested.position() == self.position() + 1
    }

    pub fn is_terminal(self) -> bool {
        self == RepairStatus::Delivered
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RepairStatus::Pending => "PENDING",
            RepairStatus::Processing => "PROCESSING",
            RepairStatus::RepairCompleted => "REPAIR_COMPLETED",
            RepairStatus::Delivered => "DELIVERED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(RepairStatus::Pending),
            "PROCESSING" => Some(RepairStatus::Processing),
            "REPAIR_COMPLETED" => Some(RepairStatus::RepairCompleted),
            "DELIVERED" => Some(RepairStatus::Delivered),
            _ => None,
        }
    }
}

/// How the bat arrived. The wire format accepts the human labels used by the
/// intake forms ("Walk-in" / "Courier") as well as the canonical names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "intake_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntakeType {
    #[serde(alias = "Walk-in")]
    WalkIn,
    #[serde(alias = "Courier")]
    Courier,
}

// =============================================================================
//  ENTITIES
// =============================================================================

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Repair {
    pub id: Uuid,
    pub bill_no: String,
    pub client_id: Uuid,
    pub brand_id: Uuid,
    pub store_id: Uuid,
    pub created_by: Uuid,
    pub status: RepairStatus,
    pub intake_type: IntakeType,
    pub total_amount: Decimal,
    pub advance_amount: Decimal,
    pub estimated_delivery_date: NaiveDate,
    pub is_postponed: bool,

    // Only the hash is ever persisted; the raw token leaves the system once,
    // inside the intake SMS.
    #[serde(skip_serializing)]
    pub tracking_token_hash: String,

    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RepairItem {
    pub id: Uuid,
    pub repair_id: Uuid,
    pub repair_type_id: Uuid,
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Joined row for repair listings (client/brand/store names resolved).
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RepairSummary {
    pub id: Uuid,
    pub bill_no: String,
    pub client_name: String,
    pub brand_name: String,
    pub store_name: String,
    pub status: RepairStatus,
    pub intake_type: IntakeType,
    pub total_amount: Decimal,
    pub advance_amount: Decimal,
    pub estimated_delivery_date: NaiveDate,
    pub is_postponed: bool,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
//  AUDIT TRAIL
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "audit_event_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditEventType {
    RepairCreated,
    StatusChanged,
    Rescheduled,
    PostponedFlag,
    DeliveryReminderSmsSent,
    DeliveryReminderSmsFailed,
}

/// Append-only audit row. `old_value`/`new_value` are the stringified
/// snapshots consumed by the existing history views; `AuditChange` is the
/// typed union they are produced from.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RepairAudit {
    pub id: Uuid,
    pub repair_id: Uuid,
    pub event_type: AuditEventType,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub performed_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Snapshot written as the `new_value` of a REPAIR_CREATED event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedSnapshot {
    pub status: RepairStatus,
    pub estimated_delivery_date: NaiveDate,
}

/// Typed audit payloads. Every mutation of a repair goes through one of these
/// variants; `columns()` renders the legacy string pair and `parse()` reads it
/// back, round-trip exact.
#[derive(Debug, Clone, PartialEq)]
pub enum AuditChange {
    Created { status: RepairStatus, estimated_delivery_date: NaiveDate },
    Status { from: RepairStatus, to: RepairStatus },
    Schedule { from: NaiveDate, to: NaiveDate },
    Postponed { from: bool, to: bool },
    ReminderSent { message: String },
    ReminderFailed { reason: String },
}

impl AuditChange {
    pub fn event_type(&self) -> AuditEventType {
        match self {
            AuditChange::Created { .. } => AuditEventType::RepairCreated,
            AuditChange::Status { .. } => AuditEventType::StatusChanged,
            AuditChange::Schedule { .. } => AuditEventType::Rescheduled,
            AuditChange::Postponed { .. } => AuditEventType::PostponedFlag,
            AuditChange::ReminderSent { .. } => AuditEventType::DeliveryReminderSmsSent,
            AuditChange::ReminderFailed { .. } => AuditEventType::DeliveryReminderSmsFailed,
        }
    }

    /// Render to the (event_type, old_value, new_value) column triple.
    pub fn columns(&self) -> (AuditEventType, Option<String>, Option<String>) {
        let (old, new) = match self {
            AuditChange::Created { status, estimated_delivery_date } => {
                let snapshot = CreatedSnapshot {
                    status: *status,
                    estimated_delivery_date: *estimated_delivery_date,
                };
                // Infallible: the snapshot is a plain struct of serializable fields.
                (None, Some(serde_json::to_string(&snapshot).unwrap_or_default()))
            }
            AuditChange::Status { from, to } => {
                (Some(from.as_str().to_string()), Some(to.as_str().to_string()))
            }
            AuditChange::Schedule { from, to } => {
                (Some(from.to_string()), Some(to.to_string()))
            }
            AuditChange::Postponed { from, to } => {
                (Some(from.to_string()), Some(to.to_string()))
            }
            AuditChange::ReminderSent { message } => (None, Some(message.clone())),
            AuditChange::ReminderFailed { reason } => (None, Some(reason.clone())),
        };
        (self.event_type(), old, new)
    }

    /// Reconstruct the typed payload from a stored row. `None` means the row
    /// predates the typed schema or was written by something else.
    pub fn parse(
        event_type: AuditEventType,
        old_value: Option<&str>,
        new_value: Option<&str>,
    ) -> Option<Self> {
        match event_type {
            AuditEventType::RepairCreated => {
                let snapshot: CreatedSnapshot = serde_json::from_str(new_value?).ok()?;
                Some(AuditChange::Created {
                    status: snapshot.status,
                    estimated_delivery_date: snapshot.estimated_delivery_date,
                })
            }
            AuditEventType::StatusChanged => Some(AuditChange::Status {
                from: RepairStatus::parse(old_value?)?,
                to: RepairStatus::parse(new_value?)?,
            }),
            AuditEventType::Rescheduled => Some(AuditChange::Schedule {
                from: old_value?.parse().ok()?,
                to: new_value?.parse().ok()?,
            }),
            AuditEventType::PostponedFlag => Some(AuditChange::Postponed {
                from: old_value?.parse().ok()?,
                to: new_value?.parse().ok()?,
            }),
            AuditEventType::DeliveryReminderSmsSent => Some(AuditChange::ReminderSent {
                message: new_value?.to_string(),
            }),
            AuditEventType::DeliveryReminderSmsFailed => Some(AuditChange::ReminderFailed {
                reason: new_value?.to_string(),
            }),
        }
    }
}

// =============================================================================
//  PUBLIC TRACKING PROJECTION
// =============================================================================

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrackingItem {
    pub repair_type: String,
    pub price: Decimal,
}

/// Read-only view returned by the public tracking page. Client identity is
/// reduced to a display name and a masked mobile number.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrackingProjection {
    pub bill_no: String,
    pub status: RepairStatus,
    pub intake_type: IntakeType,
    pub estimated_delivery_date: NaiveDate,
    pub is_postponed: bool,
    pub total_amount: Decimal,
    pub advance_amount: Decimal,
    pub client_name: String,
    pub client_mobile_masked: String,
    pub brand_name: String,
    pub store_name: String,
    pub items: Vec<TrackingItem>,
}

/// Keep the first two and last two digits, blank out the middle.
pub fn mask_mobile(mobile: &str) -> String {
    let chars: Vec<char> = mobile.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let mut out = String::new();
    for (i, c) in chars.iter().enumerate() {
        if i < 2 || i >= chars.len() - 2 {
            out.push(*c);
        } else {
            out.push('*');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_is_legal_only_one_step_forward() {
        use RepairStatus::*;
        for current in RepairStatus::ORDER {
            for requested in RepairStatus::ORDER {
                let legal = matches!(
                    (current, requested),
                    (Pending, Processing)
                        | (Processing, RepairCompleted)
                        | (RepairCompleted, Delivered)
                );
                assert_eq!(
                    current.can_advance_to(requested),
                    legal,
                    "{current:?} -> {requested:?}"
                );
            }
        }
    }

    #[test]
    fn delivered_is_terminal() {
        assert!(RepairStatus::Delivered.is_terminal());
        assert!(!RepairStatus::Pending.is_terminal());
        for requested in RepairStatus::ORDER {
            assert!(!RepairStatus::Delivered.can_advance_to(requested));
        }
    }

    #[test]
    fn intake_type_accepts_form_labels_and_canonical_names() {
        let walk_in: IntakeType = serde_json::from_str("\"Walk-in\"").unwrap();
        assert_eq!(walk_in, IntakeType::WalkIn);
        let walk_in: IntakeType = serde_json::from_str("\"WALK_IN\"").unwrap();
        assert_eq!(walk_in, IntakeType::WalkIn);
        let courier: IntakeType = serde_json::from_str("\"Courier\"").unwrap();
        assert_eq!(courier, IntakeType::Courier);
        assert!(serde_json::from_str::<IntakeType>("\"Pigeon\"").is_err());
    }

    #[test]
    fn audit_change_round_trips_through_the_string_columns() {
        let date = |s: &str| s.parse::<NaiveDate>().unwrap();
        let changes = vec![
            AuditChange::Created {
                status: RepairStatus::Pending,
                estimated_delivery_date: date("2026-02-18"),
            },
            AuditChange::Status { from: RepairStatus::Pending, to: RepairStatus::Processing },
            AuditChange::Schedule { from: date("2026-02-18"), to: date("2026-02-20") },
            AuditChange::Postponed { from: false, to: true },
            AuditChange::ReminderSent { message: "Your bat is ready".into() },
            AuditChange::ReminderFailed { reason: "gateway timeout".into() },
        ];

        for change in changes {
            let (event_type, old, new) = change.columns();
            let parsed = AuditChange::parse(event_type, old.as_deref(), new.as_deref());
            assert_eq!(parsed, Some(change));
        }
    }

    #[test]
    fn status_change_columns_are_plain_status_names() {
        let (event_type, old, new) = AuditChange::Status {
            from: RepairStatus::Pending,
            to: RepairStatus::Processing,
        }
        .columns();
        assert_eq!(event_type, AuditEventType::StatusChanged);
        assert_eq!(old.as_deref(), Some("PENDING"));
        assert_eq!(new.as_deref(), Some("PROCESSING"));
    }

    #[test]
    fn malformed_audit_rows_parse_to_none() {
        assert_eq!(AuditChange::parse(AuditEventType::StatusChanged, Some("???"), Some("PENDING")), None);
        assert_eq!(AuditChange::parse(AuditEventType::Rescheduled, None, Some("2026-02-20")), None);
        assert_eq!(AuditChange::parse(AuditEventType::RepairCreated, None, Some("not-json")), None);
    }

    #[test]
    fn mobile_masking_keeps_only_the_edges() {
        assert_eq!(mask_mobile("0771234567"), "07******67");
        assert_eq!(mask_mobile("123"), "***");
    }
}
