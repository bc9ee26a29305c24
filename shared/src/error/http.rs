//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::RewardNotFound
            | Self::RewardItemNotFound
            | Self::CatalogEntryNotFound => StatusCode::NOT_FOUND,

            Self::CpidAlreadyExists => StatusCode::CONFLICT,

            Self::NotAuthenticated | Self::TokenExpired | Self::TokenInvalid => {
                StatusCode::UNAUTHORIZED
            }

            Self::PermissionDenied => StatusCode::FORBIDDEN,

            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (validation, CPID and status-rule errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
