// src/db/session_repo.rs

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{Portal, Session},
};

#[derive(Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        token_hash: &str,
        portal: Portal,
        expires_at: DateTime<Utc>,
    ) -> Result<Session, AppError> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (user_id, token_hash, portal, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, token_hash, portal, expires_at, created_at
            "#,
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(portal)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(session)
    }

    /// A session only counts if it has not expired and was minted for the
    /// requesting portal.
    pub async fn find_live(
        &self,
        token_hash: &str,
        portal: Portal,
    ) -> Result<Option<Session>, AppError> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            SELECT id, user_id, token_hash, portal, expires_at, created_at
            FROM sessions
            WHERE token_hash = $1 AND portal = $2 AND expires_at > NOW()
            "#,
        )
        .bind(token_hash)
        .bind(portal)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    /// Opportunistic sweep of sessions past their expiry. `find_live` never
    /// returns these, so dropping them only reclaims space.
    pub async fn delete_expired(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Set deletion, not keyed to a single row: removes every session row
    /// carrying this token hash.
    pub async fn delete_by_token_hash(&self, token_hash: &str) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
            .bind(token_hash)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
