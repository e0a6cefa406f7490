// src/common/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::common::envelope::ApiResponse;

// Application error type, with `thiserror` for ergonomics. Storage-layer
// errors are pattern-matched in the repositories and translated into the
// typed variants below before they reach a handler.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation failed")]
    ValidationErrors(#[from] validator::ValidationErrors),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Duplicate(String),

    #[error("{0}")]
    NotFound(String),

    #[error("You do not have access to this module")]
    Forbidden,

    #[error("Not authenticated")]
    Unauthorized,

    #[error("Invalid username or password")]
    InvalidCredentials,

    // Tracking is intentionally switched off once a repair is delivered.
    #[error("Tracking is disabled for this repair")]
    TrackingDisabled,

    #[error("No tracking token could be recovered for this repair")]
    TrackingTokenMissing,

    #[error("SMS dispatch failed: {0}")]
    SmsSendFailed(String),

    #[error("Database error")]
    DatabaseError(#[from] sqlx::Error),

    // Catch-all for anything unexpected; `anyhow` keeps the context.
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("Bcrypt error: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),
}

impl AppError {
    /// Machine-readable code surfaced in the `error` field of the envelope.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationErrors(_) | AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Duplicate(_) => "DUPLICATE",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Forbidden => "FORBIDDEN",
            AppError::Unauthorized | AppError::InvalidCredentials => "UNAUTHORIZED",
            AppError::TrackingDisabled => "DISABLED",
            AppError::TrackingTokenMissing => "TRACKING_TOKEN_MISSING",
            AppError::SmsSendFailed(_) => "SMS_SEND_FAILED",
            AppError::DatabaseError(_) | AppError::Internal(_) | AppError::BcryptError(_) => {
                "SERVER_ERROR"
            }
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationErrors(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Duplicate(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Unauthorized | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::TrackingDisabled => StatusCode::GONE,
            AppError::TrackingTokenMissing => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::SmsSendFailed(_) => StatusCode::BAD_GATEWAY,
            AppError::DatabaseError(_) | AppError::Internal(_) | AppError::BcryptError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Field-level validation errors get flattened into one readable line.
        let message = match &self {
            AppError::ValidationErrors(errors) => {
                let mut parts: Vec<String> = Vec::new();
                for (field, field_errors) in errors.field_errors() {
                    for e in field_errors {
                        let msg = e
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| "is invalid".to_string());
                        parts.push(format!("{field}: {msg}"));
                    }
                }
                parts.sort();
                parts.join("; ")
            }
            // Never leak storage/internal details to the client.
            AppError::DatabaseError(_) | AppError::Internal(_) | AppError::BcryptError(_) => {
                tracing::error!("internal server error: {:?}", self);
                "An unexpected error occurred.".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(ApiResponse::failure(message, self.code()));
        (self.status(), body).into_response()
    }
}

/// Translate a storage error into DUPLICATE when it is a unique violation,
/// keeping the given message; everything else passes through unchanged.
pub fn map_unique_violation(e: sqlx::Error, message: impl Into<String>) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::Duplicate(message.into());
        }
    }
    e.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_follow_the_taxonomy() {
        assert_eq!(AppError::Validation("x".into()).code(), "VALIDATION_ERROR");
        assert_eq!(AppError::Duplicate("x".into()).code(), "DUPLICATE");
        assert_eq!(AppError::NotFound("x".into()).code(), "NOT_FOUND");
        assert_eq!(AppError::Forbidden.code(), "FORBIDDEN");
        assert_eq!(AppError::Unauthorized.code(), "UNAUTHORIZED");
        assert_eq!(AppError::TrackingDisabled.code(), "DISABLED");
        assert_eq!(AppError::TrackingTokenMissing.code(), "TRACKING_TOKEN_MISSING");
        assert_eq!(AppError::SmsSendFailed("x".into()).code(), "SMS_SEND_FAILED");
        assert_eq!(AppError::DatabaseError(sqlx::Error::RowNotFound).code(), "SERVER_ERROR");
    }

    #[test]
    fn http_classes_match_codes() {
        assert_eq!(AppError::Validation("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Duplicate("x".into()).status(), StatusCode::CONFLICT);
        assert_eq!(AppError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::TrackingDisabled.status(), StatusCode::GONE);
        assert_eq!(
            AppError::TrackingTokenMissing.status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(AppError::SmsSendFailed("x".into()).status(), StatusCode::BAD_GATEWAY);
    }
}
