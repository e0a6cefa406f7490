// src/services/repair.rs
//
// The repair lifecycle engine: intake, forward-only status transitions,
// rescheduling, delivery reminders, the privileged hard delete, and the
// public tracking lookup. Every multi-table mutation happens inside one
// transaction; SMS dispatch never does.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::{error::AppError, token},
    db::{AuditRepository, MasterDataRepository, NewRepair, OutboxRepository, RepairRepository},
    models::{
        auth::{Role, User},
        repair::{
            AuditChange, IntakeType, Repair, RepairAudit, RepairItem, RepairStatus,
            TrackingItem, TrackingProjection, mask_mobile,
        },
        sms::SmsType,
    },
    services::sms::{
        self, SmsProvider, delivery_reminder_message, dispatch_with_retry, repair_created_message,
    },
};

/// How many historical outbox messages are scanned when recovering a
/// tracking token for the reminder flow.
const TOKEN_SCAN_DEPTH: i64 = 20;

/// Deliberately vague: a garbage token and a valid-but-deleted token must be
/// indistinguishable to the caller.
const TRACKING_NOT_FOUND: &str = "No access or invalid tracking id.";

/// How long a reminder row stays out of the drain worker's claim window while
/// the request path dispatches it. Must outlast the worst synchronous dispatch
/// (two gateway calls plus the retry pause), or the worker could claim the row
/// mid-flight and the customer would get the SMS twice.
const REMINDER_HOLD_SECS: i64 = 300;

pub struct CreateRepairInput {
    pub bill_no: String,
    pub client_id: Uuid,
    pub brand_id: Uuid,
    pub store_id: Uuid,
    pub intake_type: IntakeType,
    pub total_amount: Decimal,
    pub advance_amount: Decimal,
    pub estimated_delivery_date: String,
    pub description: Option<String>,
    pub items: Vec<CreateRepairItemInput>,
}

pub struct CreateRepairItemInput {
    pub repair_type_id: Uuid,
    pub price: Option<Decimal>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RepairDetail {
    #[serde(flatten)]
    pub repair: Repair,
    pub items: Vec<RepairItem>,
    pub audits: Vec<RepairAudit>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReminderOutcome {
    pub already_sent: bool,
}

#[derive(Clone)]
pub struct RepairService {
    pool: PgPool,
    repairs: RepairRepository,
    audits: AuditRepository,
    outbox: OutboxRepository,
    masterdata: MasterDataRepository,
    provider: Arc<dyn SmsProvider>,
    tracking_base_url: String,
}

impl RepairService {
    pub fn new(
        pool: PgPool,
        repairs: RepairRepository,
        audits: AuditRepository,
        outbox: OutboxRepository,
        masterdata: MasterDataRepository,
        provider: Arc<dyn SmsProvider>,
        tracking_base_url: String,
    ) -> Self {
        Self {
            pool,
            repairs,
            audits,
            outbox,
            masterdata,
            provider,
            tracking_base_url,
        }
    }

    // =========================================================================
    //  CREATE
    // =========================================================================

    pub async fn create(
        &self,
        input: CreateRepairInput,
        acting_user: &User,
    ) -> Result<Repair, AppError> {
        let bill_no = input.bill_no.trim();
        validate_intake(bill_no, input.total_amount, input.advance_amount)?;

        let estimated_delivery_date = parse_date(&input.estimated_delivery_date)?;

        // Referenced master data must exist before anything is written.
        let client = self
            .masterdata
            .find_client(input.client_id)
            .await?
            .ok_or_else(|| AppError::Validation("Client does not exist.".into()))?;
        self.masterdata
            .find_brand(input.brand_id)
            .await?
            .ok_or_else(|| AppError::Validation("Brand does not exist.".into()))?;
        self.masterdata
            .find_store(input.store_id)
            .await?
            .ok_or_else(|| AppError::Validation("Store does not exist.".into()))?;

        // Resolve line items up front; price falls back to the type default.
        let mut items: Vec<(Uuid, Decimal)> = Vec::with_capacity(input.items.len());
        for item in &input.items {
            let repair_type = self
                .masterdata
                .find_repair_type(item.repair_type_id)
                .await?
                .ok_or_else(|| AppError::Validation("Repair type does not exist.".into()))?;
            let price = match item.price.or(repair_type.default_price) {
                Some(p) if p >= Decimal::ZERO => p,
                Some(_) => {
                    return Err(AppError::Validation("Item price cannot be negative.".into()));
                }
                None => {
                    return Err(AppError::Validation(format!(
                        "No price given for repair type '{}' and it has no default.",
                        repair_type.name
                    )));
                }
            };
            items.push((repair_type.id, price));
        }

        // The raw token exists only here, between generation and the rendered
        // message; after commit it is gone for good.
        let (raw_token, token_hash) = token::generate_token(token::TRACKING_TOKEN_LEN);

        let message = repair_created_message(
            &client.full_name,
            bill_no,
            estimated_delivery_date,
            &self.tracking_base_url,
            &raw_token,
        );

        let mut tx = self.pool.begin().await?;

        let repair = self
            .repairs
            .create(
                &mut *tx,
                &NewRepair {
                    bill_no,
                    client_id: input.client_id,
                    brand_id: input.brand_id,
                    store_id: input.store_id,
                    created_by: acting_user.id,
                    intake_type: input.intake_type,
                    total_amount: input.total_amount,
                    advance_amount: input.advance_amount,
                    estimated_delivery_date,
                    tracking_token_hash: &token_hash,
                    description: input.description.as_deref(),
                },
            )
            .await?;

        for (repair_type_id, price) in items {
            self.repairs
                .insert_item(&mut *tx, repair.id, repair_type_id, price)
                .await?;
        }

        self.outbox
            .enqueue(&mut *tx, repair.id, &client.mobile, &message, SmsType::RepairCreated)
            .await?;

        self.audits
            .append(
                &mut *tx,
                repair.id,
                &AuditChange::Created {
                    status: RepairStatus::Pending,
                    estimated_delivery_date,
                },
                acting_user.id,
            )
            .await?;

        tx.commit().await?;

        tracing::info!(bill_no = %repair.bill_no, "repair created");
        Ok(repair)
    }

    // =========================================================================
    //  STATUS TRANSITION
    // =========================================================================

    pub async fn advance_status(
        &self,
        repair_id: Uuid,
        requested: RepairStatus,
        acting_user: &User,
    ) -> Result<Repair, AppError> {
        let mut tx = self.pool.begin().await?;

        // The row lock makes the +1 check race-free: of two concurrent
        // advances, the second observes the already-updated status and fails.
        let repair = self
            .repairs
            .find_for_update(&mut *tx, repair_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Repair not found.".into()))?;

        if !repair.status.can_advance_to(requested) {
            return Err(AppError::Validation("Invalid status transition.".into()));
        }

        let updated = self.repairs.update_status(&mut *tx, repair_id, requested).await?;
        self.audits
            .append(
                &mut *tx,
                repair_id,
                &AuditChange::Status { from: repair.status, to: requested },
                acting_user.id,
            )
            .await?;

        tx.commit().await?;

        tracing::info!(
            bill_no = %updated.bill_no,
            from = repair.status.as_str(),
            to = requested.as_str(),
            "repair status advanced"
        );

        Ok(updated)
    }

    // =========================================================================
    //  RESCHEDULE / POSTPONE
    // =========================================================================

    pub async fn reschedule(
        &self,
        repair_id: Uuid,
        new_date: Option<&str>,
        is_postponed: Option<bool>,
        acting_user: &User,
    ) -> Result<Repair, AppError> {
        if let Some(date_str) = new_date {
            let new_date = parse_date(date_str)?;

            let mut tx = self.pool.begin().await?;
            let repair = self
                .repairs
                .find_for_update(&mut *tx, repair_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Repair not found.".into()))?;

            let updated = self.repairs.update_schedule(&mut *tx, repair_id, new_date).await?;
            self.audits
                .append(
                    &mut *tx,
                    repair_id,
                    &AuditChange::Schedule { from: repair.estimated_delivery_date, to: new_date },
                    acting_user.id,
                )
                .await?;
            tx.commit().await?;

            Ok(updated)
        } else if let Some(flag) = is_postponed {
            let mut tx = self.pool.begin().await?;
            let repair = self
                .repairs
                .find_for_update(&mut *tx, repair_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Repair not found.".into()))?;

            let updated = self.repairs.update_postponed(&mut *tx, repair_id, flag).await?;
            self.audits
                .append(
                    &mut *tx,
                    repair_id,
                    &AuditChange::Postponed { from: repair.is_postponed, to: flag },
                    acting_user.id,
                )
                .await?;
            tx.commit().await?;

            Ok(updated)
        } else {
            Err(AppError::Validation("No changes provided.".into()))
        }
    }

    // =========================================================================
    //  DELIVERY REMINDER
    // =========================================================================

    pub async fn request_delivery_reminder(
        &self,
        repair_id: Uuid,
        acting_user: &User,
    ) -> Result<ReminderOutcome, AppError> {
        let repair = self
            .repairs
            .find_by_id(repair_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Repair not found.".into()))?;

        if repair.status == RepairStatus::Delivered {
            return Err(AppError::Validation(
                "Repair has already been delivered.".into(),
            ));
        }

        // Idempotent: one successfully sent reminder per repair.
        if self
            .outbox
            .has_sent_of_type(repair_id, SmsType::DeliveryReminder)
            .await?
        {
            return Ok(ReminderOutcome { already_sent: true });
        }

        // The raw token is not stored anywhere queryable; recover it from the
        // most recent rendered messages.
        let recent = self.outbox.recent_for_repair(repair_id, TOKEN_SCAN_DEPTH).await?;
        let raw_token =
            sms::extract_tracking_token(recent.iter().map(|row| row.message.as_str()))
                .ok_or(AppError::TrackingTokenMissing)?;

        let client = self
            .masterdata
            .find_client(repair.client_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Client not found.".into()))?;

        let message = delivery_reminder_message(
            &client.full_name,
            &repair.bill_no,
            repair.estimated_delivery_date,
            &self.tracking_base_url,
            &raw_token,
        );

        // Enqueue durably first; dispatch stays outside any transaction so a
        // gateway outage can never roll back state. The hold keeps the row
        // invisible to the drain worker while this path owns it; if the
        // process dies mid-dispatch the worker inherits the row once the hold
        // lapses.
        let hold_until = Utc::now() + chrono::Duration::seconds(REMINDER_HOLD_SECS);
        let outbox_row = self
            .outbox
            .enqueue_held(
                &self.pool,
                repair_id,
                &client.mobile,
                &message,
                SmsType::DeliveryReminder,
                hold_until,
            )
            .await?;

        match dispatch_with_retry(self.provider.as_ref(), &client.mobile, &message).await {
            Ok(provider_response) => {
                self.outbox
                    .mark_sent(&self.pool, outbox_row.id, &provider_response)
                    .await?;
                self.audits
                    .append(
                        &self.pool,
                        repair_id,
                        &AuditChange::ReminderSent { message },
                        acting_user.id,
                    )
                    .await?;
                Ok(ReminderOutcome { already_sent: false })
            }
            Err(err) => {
                let reason = err.to_string();
                self.outbox.mark_failed(&self.pool, outbox_row.id, &reason).await?;
                self.audits
                    .append(
                        &self.pool,
                        repair_id,
                        &AuditChange::ReminderFailed { reason: reason.clone() },
                        acting_user.id,
                    )
                    .await?;
                Err(AppError::SmsSendFailed(reason))
            }
        }
    }

    // =========================================================================
    //  DELETE (privileged escape hatch)
    // =========================================================================

    /// Hard delete, SUPER_ADMIN only. The audit trail goes with the repair.
    pub async fn delete(&self, repair_id: Uuid, acting_user: &User) -> Result<(), AppError> {
        if acting_user.role != Role::SuperAdmin {
            return Err(AppError::Forbidden);
        }
        let deleted = self.repairs.delete(repair_id).await?;
        if !deleted {
            return Err(AppError::NotFound("Repair not found.".into()));
        }
        tracing::warn!(%repair_id, user = %acting_user.username, "repair hard-deleted");
        Ok(())
    }

    // =========================================================================
    //  READS
    // =========================================================================

    pub async fn detail(&self, repair_id: Uuid) -> Result<RepairDetail, AppError> {
        let repair = self
            .repairs
            .find_by_id(repair_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Repair not found.".into()))?;
        let items = self.repairs.items(repair_id).await?;
        let audits = self.audits.for_repair(repair_id).await?;
        Ok(RepairDetail { repair, items, audits })
    }

    pub async fn list(
        &self,
        status: Option<RepairStatus>,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<crate::models::repair::RepairSummary>, i64), AppError> {
        self.repairs.list(status, search, limit, offset).await
    }

    // =========================================================================
    //  PUBLIC TRACKING
    // =========================================================================

    pub async fn track(&self, raw_token: &str) -> Result<TrackingProjection, AppError> {
        let token_hash = token::hash_token(raw_token.trim());

        let row = self
            .repairs
            .find_tracking_row(&token_hash)
            .await?
            .ok_or_else(|| AppError::NotFound(TRACKING_NOT_FOUND.into()))?;

        if row.status == RepairStatus::Delivered {
            return Err(AppError::TrackingDisabled);
        }

        let items = self
            .repairs
            .named_items(row.id)
            .await?
            .into_iter()
            .map(|item| TrackingItem { repair_type: item.repair_type, price: item.price })
            .collect();

        Ok(TrackingProjection {
            bill_no: row.bill_no,
            status: row.status,
            intake_type: row.intake_type,
            estimated_delivery_date: row.estimated_delivery_date,
            is_postponed: row.is_postponed,
            total_amount: row.total_amount,
            advance_amount: row.advance_amount,
            client_name: row.client_name,
            client_mobile_masked: mask_mobile(&row.client_mobile),
            brand_name: row.brand_name,
            store_name: row.store_name,
            items,
        })
    }
}

/// Intake preconditions on the money fields and the bill number. The caller
/// passes an already-trimmed bill number.
fn validate_intake(bill_no: &str, total: Decimal, advance: Decimal) -> Result<(), AppError> {
    if bill_no.is_empty() {
        return Err(AppError::Validation("Bill number is required.".into()));
    }
    if total <= Decimal::ZERO {
        return Err(AppError::Validation("Total amount must be greater than zero.".into()));
    }
    if advance < Decimal::ZERO {
        return Err(AppError::Validation("Advance amount cannot be negative.".into()));
    }
    if advance > total {
        return Err(AppError::Validation(
            "Advance amount cannot exceed the total amount.".into(),
        ));
    }
    Ok(())
}

fn parse_date(s: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("'{s}' is not a valid date (expected YYYY-MM-DD).")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::dec;

    #[test]
    fn date_parsing_accepts_iso_and_rejects_garbage() {
        assert!(parse_date("2026-02-18").is_ok());
        assert!(parse_date(" 2026-02-18 ").is_ok());
        assert!(matches!(parse_date("18/02/2026"), Err(AppError::Validation(_))));
        assert!(matches!(parse_date("2026-02-30"), Err(AppError::Validation(_))));
        assert!(matches!(parse_date(""), Err(AppError::Validation(_))));
    }

    #[test]
    fn advance_exceeding_total_is_rejected() {
        assert!(matches!(
            validate_intake("B-1042", dec!(6500), dec!(6501)),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn intake_amount_preconditions() {
        assert!(validate_intake("B-1042", dec!(6500), dec!(2500)).is_ok());
        // Advance equal to total is allowed (paid in full up front).
        assert!(validate_intake("B-1042", dec!(6500), dec!(6500)).is_ok());
        assert!(validate_intake("B-1042", dec!(6500), Decimal::ZERO).is_ok());

        assert!(matches!(
            validate_intake("", dec!(6500), dec!(2500)),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            validate_intake("B-1042", Decimal::ZERO, Decimal::ZERO),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            validate_intake("B-1042", dec!(-1), Decimal::ZERO),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            validate_intake("B-1042", dec!(6500), dec!(-1)),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn reminder_hold_outlasts_the_dispatch_window() {
        use crate::services::sms::{GATEWAY_TIMEOUT, RETRY_DELAY};
        let worst_case = 2 * GATEWAY_TIMEOUT + RETRY_DELAY;
        let hold = std::time::Duration::from_secs(REMINDER_HOLD_SECS as u64);
        assert!(hold > worst_case);
    }
}
