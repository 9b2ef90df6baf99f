//! Error Types for the Corral API
//!
//! This module defines error handling for the API layer:
//! - ApiError struct for structured error responses
//! - ErrorCode enum for categorizing errors
//! - IntoResponse implementation for Axum HTTP responses
//!
//! All errors are serialized as JSON with appropriate HTTP status codes.
//! The mobile client contract only requires a `message` string per error;
//! the `code` field is additional machine-readable context.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::store::StoreError;

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for API responses.
///
/// Each error code maps to a specific HTTP status code and represents
/// a category of error that can occur during API operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================================================
    // Authentication Errors (401)
    // ========================================================================
    /// Request lacks valid authentication credentials
    Unauthorized,

    /// Authentication token is invalid or malformed
    InvalidToken,

    /// Authentication token has expired
    TokenExpired,

    // ========================================================================
    // Validation Errors (400)
    // ========================================================================
    /// Request validation failed
    ValidationFailed,

    /// Request contains invalid input data
    InvalidInput,

    /// Required field is missing from request
    MissingField,

    /// Entity with a conflicting unique field already exists
    AlreadyExists,

    // ========================================================================
    // Not Found Errors (404)
    // ========================================================================
    /// Requested customer does not exist
    CustomerNotFound,

    /// Requested lead does not exist
    LeadNotFound,

    /// Requested user does not exist
    UserNotFound,

    // ========================================================================
    // Server Errors (500)
    // ========================================================================
    /// Internal server error
    InternalError,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::Unauthorized | ErrorCode::InvalidToken | ErrorCode::TokenExpired => {
                StatusCode::UNAUTHORIZED
            }

            // The original contract reports duplicate emails as 400, not 409.
            ErrorCode::ValidationFailed
            | ErrorCode::InvalidInput
            | ErrorCode::MissingField
            | ErrorCode::AlreadyExists => StatusCode::BAD_REQUEST,

            ErrorCode::CustomerNotFound | ErrorCode::LeadNotFound | ErrorCode::UserNotFound => {
                StatusCode::NOT_FOUND
            }

            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a default message for this error code.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::Unauthorized => "Authentication required",
            ErrorCode::InvalidToken => "Invalid authentication token",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::ValidationFailed => "Request validation failed",
            ErrorCode::InvalidInput => "Invalid input data",
            ErrorCode::MissingField => "Required field is missing",
            ErrorCode::AlreadyExists => "Entity already exists",
            ErrorCode::CustomerNotFound => "Customer not found",
            ErrorCode::LeadNotFound => "Lead not found",
            ErrorCode::UserNotFound => "User not found",
            ErrorCode::InternalError => "Internal server error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// Structured error response for API operations.
///
/// This type is returned by all API endpoints when an error occurs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code categorizing the error
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,
}

impl ApiError {
    /// Create a new API error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Create a new API error with the given code, using the default message.
    pub fn from_code(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.default_message().to_string(),
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    // ========================================================================
    // Convenience constructors for common errors
    // ========================================================================

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidToken, message)
    }

    pub fn token_expired() -> Self {
        Self::from_code(ErrorCode::TokenExpired)
    }

    pub fn validation_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingField,
            format!("Required field '{}' is missing", field),
        )
    }

    pub fn customer_not_found() -> Self {
        Self::new(ErrorCode::CustomerNotFound, "Customer not found")
    }

    pub fn lead_not_found() -> Self {
        Self::new(ErrorCode::LeadNotFound, "Lead not found")
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// ============================================================================
// AXUM INTEGRATION
// ============================================================================

/// Implement IntoResponse for ApiError to enable automatic error handling
/// in Axum handlers:
/// ```ignore
/// async fn handler() -> Result<Json<Response>, ApiError> {
///     Err(ApiError::unauthorized("Invalid credentials"))
/// }
/// ```
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self);
        (status, body).into_response()
    }
}

// ============================================================================
// CONVERSIONS
// ============================================================================

/// Convert store-level failures into wire errors, preserving the exact
/// messages the HTTP contract specifies.
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UserEmailTaken => {
                ApiError::new(ErrorCode::AlreadyExists, "User already exists with this email")
            }
            StoreError::CustomerEmailTaken => ApiError::new(
                ErrorCode::AlreadyExists,
                "Customer with this email already exists",
            ),
            StoreError::InvalidCredentials => {
                ApiError::unauthorized("Invalid email or password")
            }
            StoreError::CustomerNotFound => ApiError::customer_not_found(),
            StoreError::LeadNotFound => ApiError::lead_not_found(),
            StoreError::UserNotFound => ApiError::new(ErrorCode::UserNotFound, "User not found"),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON serialization error: {:?}", err);
        ApiError::invalid_input(format!("Invalid JSON: {}", err))
    }
}

// ============================================================================
// RESULT TYPE ALIAS
// ============================================================================

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_status_mapping() {
        assert_eq!(ErrorCode::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorCode::TokenExpired.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorCode::ValidationFailed.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::AlreadyExists.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::CustomerNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::InternalError.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_store_error_messages_match_contract() {
        let err: ApiError = StoreError::CustomerEmailTaken.into();
        assert_eq!(err.message, "Customer with this email already exists");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err: ApiError = StoreError::InvalidCredentials.into();
        assert_eq!(err.message, "Invalid email or password");
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_error_serialization() -> Result<(), serde_json::Error> {
        let err = ApiError::unauthorized("Invalid token");
        let json = serde_json::to_string(&err)?;

        assert!(json.contains("UNAUTHORIZED"));
        assert!(json.contains("Invalid token"));

        let deserialized: ApiError = serde_json::from_str(&json)?;
        assert_eq!(deserialized, err);
        Ok(())
    }
}
