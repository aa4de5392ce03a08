use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use std::fmt;

/// A single field-level validation failure.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Application-wide error type
#[derive(Debug)]
pub enum AppError {
    // Database errors
    Database(sqlx::Error),
    DatabaseMigration(sqlx::migrate::MigrateError),

    // Registration errors
    DuplicateEmail,
    InvalidRole,

    // Credential errors
    InvalidCredentials,
    AccountLocked,

    // Token errors
    TokenGeneration(String),
    TokenValidation(String),
    TokenExpired,
    InvalidTokenType,
    InvalidRefreshToken,
    Unauthorized(&'static str),

    // Authorization errors
    Forbidden(String),

    // Entity errors
    NotFound(&'static str),

    // Validation errors
    Validation(Vec<FieldError>),

    // Configuration errors
    Configuration(String),

    // Cryptographic errors
    Cryptographic(String),

    // Internal errors
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Database(e) => write!(f, "Database error: {}", e),
            AppError::DatabaseMigration(e) => write!(f, "Database migration error: {}", e),
            AppError::DuplicateEmail => write!(f, "User already exists"),
            AppError::InvalidRole => write!(f, "Invalid role specified"),
            AppError::InvalidCredentials => write!(f, "Invalid credentials"),
            AppError::AccountLocked => {
                write!(f, "Account temporarily locked due to too many failed attempts")
            }
            AppError::TokenGeneration(msg) => write!(f, "Token generation failed: {}", msg),
            AppError::TokenValidation(msg) => write!(f, "Token validation failed: {}", msg),
            AppError::TokenExpired => write!(f, "Token expired."),
            AppError::InvalidTokenType => write!(f, "Invalid token type."),
            AppError::InvalidRefreshToken => write!(f, "Invalid refresh token"),
            AppError::Unauthorized(msg) => write!(f, "{}", msg),
            AppError::Forbidden(msg) => write!(f, "{}", msg),
            AppError::NotFound(what) => write!(f, "{} not found", what),
            AppError::Validation(errors) => {
                write!(f, "Validation failed ({} errors)", errors.len())
            }
            AppError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Cryptographic(msg) => write!(f, "Cryptographic error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

// Convert from various error types
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err)
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        AppError::DatabaseMigration(err)
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::ExpiredSignature => AppError::TokenExpired,
            _ => AppError::TokenValidation(err.to_string()),
        }
    }
}

// Implement IntoResponse for Axum
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Validation failures carry field-level detail in the body
        if let AppError::Validation(errors) = &self {
            let body = Json(json!({
                "message": "Validation failed",
                "errors": errors,
            }));
            return (StatusCode::BAD_REQUEST, body).into_response();
        }

        let (status, message) = match &self {
            AppError::Database(_) | AppError::DatabaseMigration(_) => {
                tracing::error!("Database error: {:?}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::DuplicateEmail => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::InvalidRole => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::AccountLocked => (StatusCode::LOCKED, self.to_string()),
            AppError::TokenGeneration(_) => {
                tracing::error!("Token generation error: {:?}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::TokenValidation(_) => {
                (StatusCode::UNAUTHORIZED, "Invalid token.".to_string())
            }
            AppError::TokenExpired => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::InvalidTokenType => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::InvalidRefreshToken => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, (*msg).to_string()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::Validation(_) => unreachable!("handled above"),
            AppError::Configuration(_) => {
                tracing::error!("Configuration error: {:?}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::Cryptographic(_) => {
                tracing::error!("Cryptographic error: {:?}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::Internal(_) => {
                tracing::error!("Internal error: {:?}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = Json(json!({
            "message": message,
        }));

        (status, body).into_response()
    }
}

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_locked_maps_to_423() {
        let response = AppError::AccountLocked.into_response();
        assert_eq!(response.status(), StatusCode::LOCKED);
    }

    #[test]
    fn test_refresh_token_failures_are_uniform() {
        // Revoked, expired, and unknown refresh tokens must all collapse into
        // the same outward message.
        assert_eq!(
            AppError::InvalidRefreshToken.to_string(),
            "Invalid refresh token"
        );
        let response = AppError::InvalidRefreshToken.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_internal_errors_do_not_leak_detail() {
        let err = AppError::Internal("connection string postgres://secret".to_string());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_expired_jwt_maps_to_token_expired() {
        let err = jsonwebtoken::errors::Error::from(
            jsonwebtoken::errors::ErrorKind::ExpiredSignature,
        );
        assert!(matches!(AppError::from(err), AppError::TokenExpired));
    }
}
