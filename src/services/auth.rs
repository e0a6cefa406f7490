// src/services/auth.rs
//
// Portal-scoped session authentication plus staff account management. The
// portal is always an explicit argument here; only the HTTP middleware is
// allowed to infer it from the request.

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;

use bcrypt::{hash, verify};
use uuid::Uuid;

use crate::{
    common::{error::AppError, token},
    db::{SessionRepository, UserRepository},
    models::auth::{Capability, Portal, Role, SystemScope, User},
};

const SESSION_TTL_DAYS: i64 = 7;

pub struct IssuedSession {
    pub user: User,
    pub raw_token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct AuthService {
    users: UserRepository,
    sessions: SessionRepository,
    pool: PgPool,
}

impl AuthService {
    pub fn new(users: UserRepository, sessions: SessionRepository, pool: PgPool) -> Self {
        Self { users, sessions, pool }
    }

    /// Verify credentials and mint a fresh session for the given portal.
    /// Existing sessions are left alone: multiple concurrent sessions per
    /// user are allowed by design.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        portal: Portal,
    ) -> Result<IssuedSession, AppError> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !user.is_active {
            return Err(AppError::InvalidCredentials);
        }

        let password = password.to_owned();
        let password_hash = user.password_hash.clone();

        // bcrypt is CPU-heavy; keep it off the async worker threads.
        let is_valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
            .await
            .map_err(|e| anyhow::anyhow!("password verification task failed: {e}"))??;

        if !is_valid {
            return Err(AppError::InvalidCredentials);
        }

        if !user.system.allows(portal) {
            // Wrong-portal logins read the same as bad credentials.
            return Err(AppError::InvalidCredentials);
        }

        // Each successful login sweeps out expired sessions, keeping the
        // table bounded without a dedicated job.
        let swept = self.sessions.delete_expired().await?;
        if swept > 0 {
            tracing::debug!(count = swept, "expired sessions removed");
        }

        let (raw_token, token_hash) = token::generate_token(token::SESSION_TOKEN_LEN);
        let expires_at = Utc::now() + Duration::days(SESSION_TTL_DAYS);

        self.sessions
            .create(user.id, &token_hash, portal, expires_at)
            .await?;

        tracing::info!(username = %user.username, portal = ?portal, "user logged in");

        Ok(IssuedSession { user, raw_token, expires_at })
    }

    /// Resolve a presented bearer token for a portal. Expired sessions and
    /// portal mismatches are indistinguishable from "not authenticated."
    pub async fn authorize(&self, raw_token: &str, portal: Portal) -> Result<User, AppError> {
        let token_hash = token::hash_token(raw_token);

        let session = self
            .sessions
            .find_live(&token_hash, portal)
            .await?
            .ok_or(AppError::Unauthorized)?;

        let user = self
            .users
            .find_by_id(session.user_id)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !user.is_active || !user.system.allows(portal) {
            return Err(AppError::Unauthorized);
        }

        Ok(user)
    }

    /// Remove every session row carrying this token hash.
    pub async fn logout(&self, raw_token: &str) -> Result<(), AppError> {
        let token_hash = token::hash_token(raw_token);
        self.sessions.delete_by_token_hash(&token_hash).await?;
        Ok(())
    }

    // =========================================================================
    //  STAFF ACCOUNTS
    // =========================================================================

    #[allow(clippy::too_many_arguments)]
    pub async fn create_user(
        &self,
        username: &str,
        full_name: &str,
        mobile: Option<&str>,
        password: &str,
        role: Role,
        system: SystemScope,
        capabilities: &[Capability],
    ) -> Result<User, AppError> {
        let password = password.to_owned();
        let password_hash = tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
            .await
            .map_err(|e| anyhow::anyhow!("password hashing task failed: {e}"))??;

        let user = self
            .users
            .create(
                &self.pool,
                username,
                full_name,
                mobile,
                &password_hash,
                role,
                system,
                capabilities,
            )
            .await?;

        Ok(user)
    }

    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        self.users.list().await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn update_user(
        &self,
        id: Uuid,
        full_name: Option<&str>,
        mobile: Option<&str>,
        role: Option<Role>,
        system: Option<SystemScope>,
        capabilities: Option<&[Capability]>,
        is_active: Option<bool>,
        password: Option<&str>,
    ) -> Result<User, AppError> {
        let password_hash = match password {
            Some(p) => {
                let p = p.to_owned();
                Some(
                    tokio::task::spawn_blocking(move || hash(&p, bcrypt::DEFAULT_COST))
                        .await
                        .map_err(|e| anyhow::anyhow!("password hashing task failed: {e}"))??,
                )
            }
            None => None,
        };

        self.users
            .update(
                id,
                full_name,
                mobile,
                role,
                system,
                capabilities,
                is_active,
                password_hash.as_deref(),
            )
            .await?
            .ok_or_else(|| AppError::NotFound("User not found.".into()))
    }
}
