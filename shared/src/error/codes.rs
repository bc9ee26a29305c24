//! Unified error codes for the rewards catalog
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Feature flag errors
//! - 6xxx: Reward errors
//! - 7xxx: Client catalog errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Serialized as its `u16` value so the admin frontend can switch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Validation failed
    ValidationFailed = 2,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,

    // ==================== 3xxx: Feature ====================
    /// Feature disabled by configuration
    FeatureNotAvailable = 3001,

    // ==================== 6xxx: Reward ====================
    /// No reward family matches the CPID
    RewardNotFound = 6001,
    /// Source item not found in the reward family
    RewardItemNotFound = 6002,
    /// CPID is malformed (fewer than four segments)
    InvalidCpid = 6003,
    /// Brand name too short to build a CPID
    CpidBrandTooShort = 6004,
    /// CPID already used by another item
    CpidAlreadyExists = 6005,
    /// All source letters A-Z are taken
    SourceLettersExhausted = 6006,
    /// Status not allowed at this lifecycle stage
    InvalidStatusTransition = 6101,

    // ==================== 7xxx: Catalog ====================
    /// Reward is not linked to the client catalog
    CatalogEntryNotFound = 7001,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::ValidationFailed => "Validation failed",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",

            // Feature
            ErrorCode::FeatureNotAvailable => "Feature is not enabled",

            // Reward
            ErrorCode::RewardNotFound => "Reward not found",
            ErrorCode::RewardItemNotFound => "Reward source item not found",
            ErrorCode::InvalidCpid => "CPID must have at least four segments",
            ErrorCode::CpidBrandTooShort => {
                "Brand name needs at least 5 letters or digits to build a CPID"
            }
            ErrorCode::CpidAlreadyExists => "CPID already exists",
            ErrorCode::SourceLettersExhausted => "No source letter left for this reward",
            ErrorCode::InvalidStatusTransition => "Status transition is not allowed",

            // Catalog
            ErrorCode::CatalogEntryNotFound => "Reward is not in this catalog",

            // System
            ErrorCode::InternalError => "Internal server error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            2 => Ok(ErrorCode::ValidationFailed),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),

            // Feature
            3001 => Ok(ErrorCode::FeatureNotAvailable),

            // Reward
            6001 => Ok(ErrorCode::RewardNotFound),
            6002 => Ok(ErrorCode::RewardItemNotFound),
            6003 => Ok(ErrorCode::InvalidCpid),
            6004 => Ok(ErrorCode::CpidBrandTooShort),
            6005 => Ok(ErrorCode::CpidAlreadyExists),
            6006 => Ok(ErrorCode::SourceLettersExhausted),
            6101 => Ok(ErrorCode::InvalidStatusTransition),

            // Catalog
            7001 => Ok(ErrorCode::CatalogEntryNotFound),

            // System
            9001 => Ok(ErrorCode::InternalError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
