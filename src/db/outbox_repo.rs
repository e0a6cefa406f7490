// src/db/outbox_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::sms::{SmsOutbox, SmsStatus, SmsType},
};

const OUTBOX_COLUMNS: &str = r#"
    id, repair_id, recipient, message, sms_type, status,
    scheduled_for, sent_at, provider_response, created_at
"#;

#[derive(Clone)]
pub struct OutboxRepository {
    pool: PgPool,
}

impl OutboxRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Enqueue a PENDING message. Called inside the same transaction as the
    /// state change the message announces.
    pub async fn enqueue<'e, E>(
        &self,
        executor: E,
        repair_id: Uuid,
        recipient: &str,
        message: &str,
        sms_type: SmsType,
    ) -> Result<SmsOutbox, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, SmsOutbox>(&format!(
            r#"
            INSERT INTO sms_outbox (repair_id, recipient, message, sms_type)
            VALUES ($1, $2, $3, $4)
            RETURNING {OUTBOX_COLUMNS}
            "#
        ))
        .bind(repair_id)
        .bind(recipient)
        .bind(message)
        .bind(sms_type)
        .fetch_one(executor)
        .await?;

        Ok(row)
    }

    /// Enqueue a PENDING message that stays out of the drain worker's claim
    /// window until `scheduled_for`. Used when the caller dispatches the row
    /// itself: the worker only inherits it if the caller dies before marking
    /// an outcome.
    pub async fn enqueue_held<'e, E>(
        &self,
        executor: E,
        repair_id: Uuid,
        recipient: &str,
        message: &str,
        sms_type: SmsType,
        scheduled_for: DateTime<Utc>,
    ) -> Result<SmsOutbox, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, SmsOutbox>(&format!(
            r#"
            INSERT INTO sms_outbox (repair_id, recipient, message, sms_type, scheduled_for)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {OUTBOX_COLUMNS}
            "#
        ))
        .bind(repair_id)
        .bind(recipient)
        .bind(message)
        .bind(sms_type)
        .bind(scheduled_for)
        .fetch_one(executor)
        .await?;

        Ok(row)
    }

    /// Best-effort post-dispatch update; deliberately outside any transaction
    /// with the repair row.
    pub async fn mark_sent<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        provider_response: &str,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE sms_outbox
            SET status = 'SENT', sent_at = NOW(), provider_response = $2
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(provider_response)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn mark_failed<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        provider_response: &str,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE sms_outbox
            SET status = 'FAILED', provider_response = $2
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(provider_response)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// The most recent messages for a repair, newest first. Used to recover
    /// the tracking token from previously rendered message text.
    pub async fn recent_for_repair(
        &self,
        repair_id: Uuid,
        limit: i64,
    ) -> Result<Vec<SmsOutbox>, AppError> {
        let rows = sqlx::query_as::<_, SmsOutbox>(&format!(
            r#"
            SELECT {OUTBOX_COLUMNS}
            FROM sms_outbox
            WHERE repair_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#
        ))
        .bind(repair_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Whether a message of this type has already reached SENT for a repair.
    pub async fn has_sent_of_type(
        &self,
        repair_id: Uuid,
        sms_type: SmsType,
    ) -> Result<bool, AppError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sms_outbox WHERE repair_id = $1 AND sms_type = $2 AND status = 'SENT'",
        )
        .bind(repair_id)
        .bind(sms_type)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    /// Claim a batch of due PENDING rows for the drain worker. Runs inside
    /// the worker's transaction; SKIP LOCKED keeps concurrent drains from
    /// double-claiming.
    pub async fn claim_pending<'e, E>(
        &self,
        executor: E,
        batch: i64,
    ) -> Result<Vec<SmsOutbox>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, SmsOutbox>(&format!(
            r#"
            SELECT {OUTBOX_COLUMNS}
            FROM sms_outbox
            WHERE status = 'PENDING' AND scheduled_for <= NOW()
            ORDER BY scheduled_for ASC
            LIMIT $1
            FOR UPDATE SKIP LOCKED
            "#
        ))
        .bind(batch)
        .fetch_all(executor)
        .await?;

        Ok(rows)
    }

    pub async fn list(
        &self,
        status: Option<SmsStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<SmsOutbox>, i64), AppError> {
        let rows = sqlx::query_as::<_, SmsOutbox>(&format!(
            r#"
            SELECT {OUTBOX_COLUMNS}
            FROM sms_outbox
            WHERE ($1::sms_status IS NULL OR status = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sms_outbox WHERE ($1::sms_status IS NULL OR status = $1)",
        )
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok((rows, total))
    }
}
