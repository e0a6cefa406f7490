// src/db/report_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{common::error::AppError, models::repair::RepairStatus};

/// Raw repair row feeding the income projection; received/balance are
/// derived in the service, not here.
#[derive(Debug, sqlx::FromRow)]
pub struct IncomeRow {
    pub repair_id: Uuid,
    pub bill_no: String,
    pub client_name: String,
    pub status: RepairStatus,
    pub estimated_delivery_date: NaiveDate,
    pub total_amount: Decimal,
    pub advance_amount: Decimal,
}

#[derive(Clone)]
pub struct ReportRepository {
    pool: PgPool,
}

impl ReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn income_rows(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<IncomeRow>, AppError> {
        let rows = sqlx::query_as::<_, IncomeRow>(
            r#"
            SELECT
                r.id AS repair_id,
                r.bill_no,
                c.full_name AS client_name,
                r.status,
                r.estimated_delivery_date,
                r.total_amount,
                r.advance_amount
            FROM repairs r
            JOIN clients c ON c.id = r.client_id
            WHERE ($1::date IS NULL OR r.created_at::date >= $1)
              AND ($2::date IS NULL OR r.created_at::date <= $2)
            ORDER BY r.created_at ASC
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
