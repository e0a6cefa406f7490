// src/db/user_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{AppError, map_unique_violation},
    models::auth::{Capability, Role, SystemScope, User},
};

const USER_COLUMNS: &str = r#"
    id, username, full_name, mobile, password_hash,
    role, system, capabilities, is_active, created_at, updated_at
"#;

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe_user)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe_user)
    }

    pub async fn list(&self) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create<'e, E>(
        &self,
        executor: E,
        username: &str,
        full_name: &str,
        mobile: Option<&str>,
        password_hash: &str,
        role: Role,
        system: SystemScope,
        capabilities: &[Capability],
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, full_name, mobile, password_hash, role, system, capabilities)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(username)
        .bind(full_name)
        .bind(mobile)
        .bind(password_hash)
        .bind(role)
        .bind(system)
        .bind(capabilities)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, format!("Username '{username}' is already taken.")))?;

        Ok(user)
    }

    /// Patch-style update: only the supplied fields change.
    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        &self,
        id: Uuid,
        full_name: Option<&str>,
        mobile: Option<&str>,
        role: Option<Role>,
        system: Option<SystemScope>,
        capabilities: Option<&[Capability]>,
        is_active: Option<bool>,
        password_hash: Option<&str>,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET
                full_name = COALESCE($2, full_name),
                mobile = COALESCE($3, mobile),
                role = COALESCE($4, role),
                system = COALESCE($5, system),
                capabilities = COALESCE($6, capabilities),
                is_active = COALESCE($7, is_active),
                password_hash = COALESCE($8, password_hash),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(full_name)
        .bind(mobile)
        .bind(role)
        .bind(system)
        .bind(capabilities)
        .bind(is_active)
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
