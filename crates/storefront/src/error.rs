//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`.
//!
//! Every failure maps to a stable machine-readable `kind` plus a human
//! message in the JSON body; raw infrastructure errors are never leaked.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::checkout::CheckoutError;
use crate::services::token::TokenError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// No, invalid, or expired session credential.
    #[error("Not authenticated")]
    Unauthenticated,

    /// Checkout gate: phone or deliverable address missing.
    #[error("Profile incomplete")]
    ProfileIncomplete,

    /// Checkout with an empty cart snapshot.
    #[error("Cart is empty")]
    EmptyCart,

    /// A backing store failed or timed out.
    #[error("Store unavailable")]
    StoreUnavailable,

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<CheckoutError> for AppError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::Unauthenticated => Self::Unauthenticated,
            CheckoutError::ProfileIncomplete => Self::ProfileIncomplete,
            CheckoutError::EmptyCart => Self::EmptyCart,
            CheckoutError::StoreUnavailable => Self::StoreUnavailable,
        }
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid => Self::Unauthenticated,
            TokenError::Signing => Self::Internal("credential issuance failed".to_owned()),
        }
    }
}

/// JSON error body: `{"error": {"kind": ..., "message": ...}}`.
#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    kind: &'static str,
    message: String,
}

impl AppError {
    /// Stable machine-readable kind for the client.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Database(RepositoryError::Conflict(_)) | Self::Auth(AuthError::UserAlreadyExists) => {
                "conflict"
            }
            Self::Database(RepositoryError::NotFound) | Self::NotFound(_) => "not_found",
            Self::Database(_) | Self::StoreUnavailable => "store_unavailable",
            Self::Auth(AuthError::InvalidCredentials) | Self::Unauthenticated => "unauthenticated",
            Self::Auth(AuthError::WeakPassword(_) | AuthError::InvalidEmail(_))
            | Self::BadRequest(_) => "bad_request",
            Self::Auth(_) | Self::Internal(_) => "internal",
            Self::ProfileIncomplete => "profile_incomplete",
            Self::EmptyCart => "empty_cart",
        }
    }

    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Database(RepositoryError::Conflict(_)) | Self::Auth(AuthError::UserAlreadyExists) => {
                StatusCode::CONFLICT
            }
            Self::Database(RepositoryError::NotFound) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(_) | Self::StoreUnavailable | Self::Auth(AuthError::Repository(_) | AuthError::PasswordHash) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Auth(AuthError::InvalidCredentials) | Self::Unauthenticated => {
                StatusCode::UNAUTHORIZED
            }
            Self::Auth(_) | Self::ProfileIncomplete | Self::EmptyCart | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
        }
    }

    /// Human-readable message, with internal details stripped.
    fn message(&self) -> String {
        match self {
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::StoreUnavailable => "Failed to place order".to_string(),
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Invalid credentials".to_string(),
                AuthError::UserAlreadyExists => {
                    "An account with this email already exists".to_string()
                }
                AuthError::WeakPassword(msg) => msg.clone(),
                AuthError::InvalidEmail(_) => "Invalid email address".to_string(),
                _ => "Authentication error".to_string(),
            },
            Self::Unauthenticated => "Not authenticated".to_string(),
            Self::ProfileIncomplete => {
                "Profile incomplete. Please add your phone and address in Account settings."
                    .to_string()
            }
            Self::EmptyCart => "Cart is empty".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(
            self,
            Self::Database(_) | Self::Internal(_) | Self::StoreUnavailable
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();
        let body = ErrorBody {
            error: ErrorDetail {
                kind: self.kind(),
                message: self.message(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_checkout_error_mapping() {
        assert_eq!(
            AppError::from(CheckoutError::Unauthenticated).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::from(CheckoutError::ProfileIncomplete).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(CheckoutError::EmptyCart).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(CheckoutError::StoreUnavailable).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_stable_kinds() {
        assert_eq!(AppError::Unauthenticated.kind(), "unauthenticated");
        assert_eq!(AppError::ProfileIncomplete.kind(), "profile_incomplete");
        assert_eq!(AppError::EmptyCart.kind(), "empty_cart");
        assert_eq!(AppError::StoreUnavailable.kind(), "store_unavailable");
        assert_eq!(
            AppError::Auth(AuthError::UserAlreadyExists).kind(),
            "conflict"
        );
        assert_eq!(AppError::NotFound("x".to_string()).kind(), "not_found");
    }

    #[test]
    fn test_conflict_maps_to_409() {
        let err = AppError::Auth(AuthError::UserAlreadyExists);
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_internal_details_are_not_leaked() {
        let err = AppError::Internal("connection string postgres://user:pw@host".to_string());
        assert_eq!(err.message(), "Internal server error");
    }
}
