// src/middleware/auth.rs
//
// Boundary adapter between HTTP and the session layer. This is the only
// place a portal is inferred from the request (each guard hard-codes its
// portal and cookie); everything below receives the portal as a value.

use axum::{
    extract::{FromRequestParts, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    common::error::AppError,
    config::AppState,
    models::auth::{Capability, Portal, User},
};

/// The authenticated user plus the portal their session belongs to.
#[derive(Clone)]
pub struct SessionContext {
    pub user: User,
    pub portal: Portal,
}

pub async fn operation_guard(
    State(app_state): State<AppState>,
    jar: CookieJar,
    request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    guard(app_state, jar, request, next, Portal::Operation).await
}

pub async fn accounting_guard(
    State(app_state): State<AppState>,
    jar: CookieJar,
    request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    guard(app_state, jar, request, next, Portal::Accounting).await
}

async fn guard(
    app_state: AppState,
    jar: CookieJar,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
    portal: Portal,
) -> Result<Response, AppError> {
    let token = jar
        .get(portal.cookie_name())
        .map(|cookie| cookie.value().to_string())
        .ok_or(AppError::Unauthorized)?;

    let user = app_state.auth_service.authorize(&token, portal).await?;

    request
        .extensions_mut()
        .insert(SessionContext { user, portal });
    Ok(next.run(request).await)
}

/// Extractor handing handlers the authenticated user and portal.
pub struct AuthenticatedUser(pub SessionContext);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionContext>()
            .cloned()
            .map(AuthenticatedUser)
            .ok_or(AppError::Unauthorized)
    }
}

impl AuthenticatedUser {
    pub fn user(&self) -> &User {
        &self.0.user
    }

    /// FORBIDDEN unless the user holds the capability (SUPER_ADMIN always does).
    pub fn require(&self, capability: Capability) -> Result<&User, AppError> {
        if self.0.user.has_capability(capability) {
            Ok(&self.0.user)
        } else {
            Err(AppError::Forbidden)
        }
    }
}
