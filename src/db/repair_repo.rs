// src/db/repair_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{AppError, map_unique_violation},
    models::repair::{IntakeType, Repair, RepairStatus, RepairSummary},
};

const REPAIR_COLUMNS: &str = r#"
    id, bill_no, client_id, brand_id, store_id, created_by,
    status, intake_type, total_amount, advance_amount,
    estimated_delivery_date, is_postponed, tracking_token_hash,
    description, created_at, updated_at
"#;

/// Column set for a fully-validated new repair; the service owns validation,
/// this is just the write.
pub struct NewRepair<'a> {
    pub bill_no: &'a str,
    pub client_id: Uuid,
    pub brand_id: Uuid,
    pub store_id: Uuid,
    pub created_by: Uuid,
    pub intake_type: IntakeType,
    pub total_amount: Decimal,
    pub advance_amount: Decimal,
    pub estimated_delivery_date: NaiveDate,
    pub tracking_token_hash: &'a str,
    pub description: Option<&'a str>,
}

/// Joined row backing the public tracking page.
#[derive(Debug, sqlx::FromRow)]
pub struct TrackingRow {
    pub id: Uuid,
    pub bill_no: String,
    pub status: RepairStatus,
    pub intake_type: IntakeType,
    pub total_amount: Decimal,
    pub advance_amount: Decimal,
    pub estimated_delivery_date: NaiveDate,
    pub is_postponed: bool,
    pub client_name: String,
    pub client_mobile: String,
    pub brand_name: String,
    pub store_name: String,
}

#[derive(Debug, sqlx::FromRow)]
pub struct ItemRow {
    pub repair_type: String,
    pub price: Decimal,
}

#[derive(Clone)]
pub struct RepairRepository {
    pool: PgPool,
}

impl RepairRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(&self, executor: E, new: &NewRepair<'_>) -> Result<Repair, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let repair = sqlx::query_as::<_, Repair>(&format!(
            r#"
            INSERT INTO repairs (
                bill_no, client_id, brand_id, store_id, created_by,
                intake_type, total_amount, advance_amount,
                estimated_delivery_date, tracking_token_hash, description
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {REPAIR_COLUMNS}
            "#
        ))
        .bind(new.bill_no)
        .bind(new.client_id)
        .bind(new.brand_id)
        .bind(new.store_id)
        .bind(new.created_by)
        .bind(new.intake_type)
        .bind(new.total_amount)
        .bind(new.advance_amount)
        .bind(new.estimated_delivery_date)
        .bind(new.tracking_token_hash)
        .bind(new.description)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            map_unique_violation(e, format!("Bill number '{}' is already in use.", new.bill_no))
        })?;

        Ok(repair)
    }

    pub async fn insert_item<'e, E>(
        &self,
        executor: E,
        repair_id: Uuid,
        repair_type_id: Uuid,
        price: Decimal,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("INSERT INTO repair_items (repair_id, repair_type_id, price) VALUES ($1, $2, $3)")
            .bind(repair_id)
            .bind(repair_type_id)
            .bind(price)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Repair>, AppError> {
        let repair = sqlx::query_as::<_, Repair>(&format!(
            "SELECT {REPAIR_COLUMNS} FROM repairs WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(repair)
    }

    /// Row-locked read used by status transitions: the current status must be
    /// observed inside the same transaction that writes the new one, or two
    /// concurrent advances could both pass the +1 check.
    pub async fn find_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Repair>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let repair = sqlx::query_as::<_, Repair>(&format!(
            "SELECT {REPAIR_COLUMNS} FROM repairs WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(repair)
    }

    /// Returns the updated row so callers never serve a stale `updated_at`.
    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: RepairStatus,
    ) -> Result<Repair, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let repair = sqlx::query_as::<_, Repair>(&format!(
            r#"
            UPDATE repairs SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {REPAIR_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status)
        .fetch_one(executor)
        .await?;
        Ok(repair)
    }

    /// Changing the delivery date always forces the postponed flag on.
    pub async fn update_schedule<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        estimated_delivery_date: NaiveDate,
    ) -> Result<Repair, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let repair = sqlx::query_as::<_, Repair>(&format!(
            r#"
            UPDATE repairs
            SET estimated_delivery_date = $2, is_postponed = TRUE, updated_at = NOW()
            WHERE id = $1
            RETURNING {REPAIR_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(estimated_delivery_date)
        .fetch_one(executor)
        .await?;
        Ok(repair)
    }

    pub async fn update_postponed<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        is_postponed: bool,
    ) -> Result<Repair, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let repair = sqlx::query_as::<_, Repair>(&format!(
            r#"
            UPDATE repairs SET is_postponed = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {REPAIR_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(is_postponed)
        .fetch_one(executor)
        .await?;
        Ok(repair)
    }

    /// Hard delete; dependent items, audits and outbox rows cascade with it.
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM repairs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list(
        &self,
        status: Option<RepairStatus>,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<RepairSummary>, i64), AppError> {
        let pattern = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{s}%"));

        let summaries = sqlx::query_as::<_, RepairSummary>(
            r#"
            SELECT
                r.id, r.bill_no,
                c.full_name AS client_name,
                b.name AS brand_name,
                s.name AS store_name,
                r.status, r.intake_type, r.total_amount, r.advance_amount,
                r.estimated_delivery_date, r.is_postponed, r.created_at
            FROM repairs r
            JOIN clients c ON c.id = r.client_id
            JOIN brands b ON b.id = r.brand_id
            JOIN stores s ON s.id = r.store_id
            WHERE ($1::repair_status IS NULL OR r.status = $1)
              AND ($2::text IS NULL OR r.bill_no ILIKE $2 OR c.full_name ILIKE $2 OR c.mobile ILIKE $2)
            ORDER BY r.created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(status)
        .bind(&pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM repairs r
            JOIN clients c ON c.id = r.client_id
            WHERE ($1::repair_status IS NULL OR r.status = $1)
              AND ($2::text IS NULL OR r.bill_no ILIKE $2 OR c.full_name ILIKE $2 OR c.mobile ILIKE $2)
            "#,
        )
        .bind(status)
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        Ok((summaries, total))
    }

    pub async fn items(&self, repair_id: Uuid) -> Result<Vec<crate::models::repair::RepairItem>, AppError> {
        let items = sqlx::query_as::<_, crate::models::repair::RepairItem>(
            r#"
            SELECT id, repair_id, repair_type_id, price, created_at
            FROM repair_items
            WHERE repair_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(repair_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    pub async fn find_tracking_row(&self, token_hash: &str) -> Result<Option<TrackingRow>, AppError> {
        let row = sqlx::query_as::<_, TrackingRow>(
            r#"
            SELECT
                r.id, r.bill_no, r.status, r.intake_type,
                r.total_amount, r.advance_amount,
                r.estimated_delivery_date, r.is_postponed,
                c.full_name AS client_name,
                c.mobile AS client_mobile,
                b.name AS brand_name,
                s.name AS store_name
            FROM repairs r
            JOIN clients c ON c.id = r.client_id
            JOIN brands b ON b.id = r.brand_id
            JOIN stores s ON s.id = r.store_id
            WHERE r.tracking_token_hash = $1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Line items with the repair-type name resolved, for the tracking page.
    pub async fn named_items(&self, repair_id: Uuid) -> Result<Vec<ItemRow>, AppError> {
        let items = sqlx::query_as::<_, ItemRow>(
            r#"
            SELECT rt.name AS repair_type, ri.price
            FROM repair_items ri
            JOIN repair_types rt ON rt.id = ri.repair_type_id
            WHERE ri.repair_id = $1
            ORDER BY ri.created_at ASC
            "#,
        )
        .bind(repair_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }
}
