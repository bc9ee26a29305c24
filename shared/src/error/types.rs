//! Error types and API response structures

use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Application error with structured error code and details
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    /// The error code identifying the type of error
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details (field-level errors, context, etc.)
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// Create a new error with the default message for the error code
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
            details: None,
        }
    }

    /// Create a new error with a custom message
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Add a detail entry to this error
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Get the HTTP status code for this error
    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    // ==================== Convenience constructors ====================

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    /// Reward family lookup found nothing for this CPID
    pub fn reward_not_found(cpid: impl Into<String>) -> Self {
        Self::new(ErrorCode::RewardNotFound).with_detail("cpid", cpid.into())
    }

    /// Create a not authenticated error
    pub fn not_authenticated() -> Self {
        Self::new(ErrorCode::NotAuthenticated)
    }

    /// Create a permission denied error
    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::PermissionDenied, msg)
    }

    /// Feature switched off through configuration
    pub fn feature_disabled(feature: &str) -> Self {
        Self::with_message(
            ErrorCode::FeatureNotAvailable,
            format!("Feature '{feature}' is not enabled"),
        )
        .with_detail("feature", feature)
    }

    /// Create an invalid token error
    pub fn invalid_token(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::TokenInvalid, msg)
    }

    /// Create a token expired error
    pub fn token_expired() -> Self {
        Self::new(ErrorCode::TokenExpired)
    }
}

/// JSON body of every error response
///
/// - `code`: numeric [`ErrorCode`]
/// - `message`: Human-readable message
/// - `details`: Additional context (field name, CPID, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.code.code(),
            message: err.message.clone(),
            details: err.details.clone(),
        }
    }
}

// ===== Axum Integration =====

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;

        let status = self.http_status();
        let body = ErrorResponse::from(&self);

        if matches!(self.code.category(), super::category::ErrorCategory::System) {
            tracing::error!(
                code = %self.code,
                message = %self.message,
                "System error occurred"
            );
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_new() {
        let err = AppError::new(ErrorCode::RewardNotFound);
        assert_eq!(err.code, ErrorCode::RewardNotFound);
        assert_eq!(err.message, "Reward not found");
        assert!(err.details.is_none());
    }

    #[test]
    fn test_app_error_with_detail() {
        let err = AppError::validation("Missing required fields")
            .with_detail("field", "brand_name")
            .with_detail("reason", "required");

        assert_eq!(err.code, ErrorCode::ValidationFailed);
        let details = err.details.unwrap();
        assert_eq!(details.get("field").unwrap(), "brand_name");
        assert_eq!(details.get("reason").unwrap(), "required");
    }

    #[test]
    fn test_reward_not_found_carries_cpid() {
        let err = AppError::reward_not_found("OC-ACMEHEALTH-EN-10");
        assert_eq!(err.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(
            err.details.unwrap().get("cpid").unwrap(),
            "OC-ACMEHEALTH-EN-10"
        );
    }

    #[test]
    fn test_feature_disabled() {
        let err = AppError::feature_disabled("multi_source");
        assert_eq!(err.code, ErrorCode::FeatureNotAvailable);
        assert_eq!(err.message, "Feature 'multi_source' is not enabled");
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::with_message(ErrorCode::RewardItemNotFound, "Item 42 not found");
        assert_eq!(format!("{}", err), "Item 42 not found");
    }

    #[test]
    fn test_error_response() {
        let err = AppError::with_message(ErrorCode::InvalidCpid, "bad cpid")
            .with_detail("cpid", "OC-X");
        let response = ErrorResponse::from(&err);

        assert_eq!(response.code, 6003);
        assert_eq!(response.message, "bad cpid");
        assert!(response.details.is_some());
    }

    #[test]
    fn test_error_response_serialize() {
        let response = ErrorResponse::from(&AppError::new(ErrorCode::RewardNotFound));
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"code\":6001"));
        assert!(json.contains("\"message\":\"Reward not found\""));
        assert!(!json.contains("details"));
    }

    #[test]
    fn test_into_response_status() {
        use axum::response::IntoResponse;

        let response = AppError::new(ErrorCode::CpidAlreadyExists).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
