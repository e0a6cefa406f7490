// src/db/audit_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::repair::{AuditChange, RepairAudit},
};

/// Append-only writer/reader for the repair audit trail. There is no update
/// or delete path here on purpose.
#[derive(Clone)]
pub struct AuditRepository {
    pool: PgPool,
}

impl AuditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append one audit row from a typed change payload.
    pub async fn append<'e, E>(
        &self,
        executor: E,
        repair_id: Uuid,
        change: &AuditChange,
        performed_by: Uuid,
    ) -> Result<RepairAudit, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let (event_type, old_value, new_value) = change.columns();

        let audit = sqlx::query_as::<_, RepairAudit>(
            r#"
            INSERT INTO repair_audits (repair_id, event_type, old_value, new_value, performed_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, repair_id, event_type, old_value, new_value, performed_by, created_at
            "#,
        )
        .bind(repair_id)
        .bind(event_type)
        .bind(old_value)
        .bind(new_value)
        .bind(performed_by)
        .fetch_one(executor)
        .await?;

        Ok(audit)
    }

    pub async fn for_repair(&self, repair_id: Uuid) -> Result<Vec<RepairAudit>, AppError> {
        let audits = sqlx::query_as::<_, RepairAudit>(
            r#"
            SELECT id, repair_id, event_type, old_value, new_value, performed_by, created_at
            FROM repair_audits
            WHERE repair_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(repair_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(audits)
    }
}
