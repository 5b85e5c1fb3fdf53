//! Unified request-boundary error handling.
//!
//! Every route handler returns `Result<T, AppError>`. Errors never propagate
//! past a single request; server-side failures are logged and surfaced to the
//! client as a generic message so internals never leak.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::listings::ListingError;
use crate::uploads::UploadError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Listing operation failed.
    #[error("Listing error: {0}")]
    Listing(#[from] ListingError),

    /// Upload persistence failed.
    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),

    /// Request carried no resolvable session. Missing, unknown, and expired
    /// tokens all land here.
    #[error("Invalid session")]
    InvalidSession,

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Upload(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials
                | AuthError::UserAlreadyExists
                | AuthError::InvalidUsername(_)
                | AuthError::InvalidEmail(_)
                | AuthError::InvalidPasswordEncoding => StatusCode::BAD_REQUEST,
                AuthError::PasswordHash | AuthError::Repository(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Listing(err) => match err {
                ListingError::NotFound => StatusCode::NOT_FOUND,
                ListingError::NotOwner => StatusCode::FORBIDDEN,
                ListingError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::InvalidSession | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Message safe to show to the client.
    fn client_message(&self) -> String {
        match self {
            Self::Database(_) | Self::Upload(_) => "Internal server error".to_owned(),
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Invalid username or password".to_owned(),
                AuthError::UserAlreadyExists => "User already exists".to_owned(),
                AuthError::InvalidUsername(e) => e.to_string(),
                AuthError::InvalidEmail(e) => e.to_string(),
                AuthError::InvalidPasswordEncoding => "Malformed password payload".to_owned(),
                AuthError::PasswordHash | AuthError::Repository(_) => {
                    "Internal server error".to_owned()
                }
            },
            Self::Listing(err) => match err {
                ListingError::NotFound => "Item not found".to_owned(),
                ListingError::NotOwner => {
                    "You do not have permission to delete this item".to_owned()
                }
                ListingError::Repository(_) => "Internal server error".to_owned(),
            },
            Self::InvalidSession => "Invalid session".to_owned(),
            Self::BadRequest(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request error");
        }

        (status, Json(json!({ "error": self.client_message() }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_error_status_codes() {
        assert_eq!(get_status(AppError::InvalidSession), StatusCode::BAD_REQUEST);
        assert_eq!(
            get_status(AppError::BadRequest("missing field".to_owned())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Listing(ListingError::NotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Listing(ListingError::NotOwner)),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::UserAlreadyExists)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::InvalidCredentials)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::PasswordHash)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::NotFound)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn server_errors_hide_internals() {
        let err = AppError::Database(RepositoryError::DataCorruption(
            "invalid email in database".to_owned(),
        ));
        assert_eq!(err.client_message(), "Internal server error");
    }

    #[test]
    fn authorization_errors_stay_specific() {
        assert_eq!(
            AppError::Listing(ListingError::NotOwner).client_message(),
            "You do not have permission to delete this item"
        );
        assert_eq!(
            AppError::Listing(ListingError::NotFound).client_message(),
            "Item not found"
        );
    }
}
