//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category, determined by the leading digit of the error code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Authentication errors (1xxx)
    Auth,
    /// Permission errors (2xxx)
    Permission,
    /// Feature flag errors (3xxx)
    Feature,
    /// Reward errors (6xxx)
    Reward,
    /// Client catalog errors (7xxx)
    Catalog,
    /// System errors (9xxx and anything unassigned)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Auth,
            2000..3000 => Self::Permission,
            3000..4000 => Self::Feature,
            6000..7000 => Self::Reward,
            7000..8000 => Self::Catalog,
            _ => Self::System,
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_code() {
        assert_eq!(ErrorCategory::from_code(0), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(999), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(1001), ErrorCategory::Auth);
        assert_eq!(ErrorCategory::from_code(2001), ErrorCategory::Permission);
        assert_eq!(ErrorCategory::from_code(3001), ErrorCategory::Feature);
        assert_eq!(ErrorCategory::from_code(6101), ErrorCategory::Reward);
        assert_eq!(ErrorCategory::from_code(7001), ErrorCategory::Catalog);
        assert_eq!(ErrorCategory::from_code(4001), ErrorCategory::System);
        assert_eq!(ErrorCategory::from_code(9001), ErrorCategory::System);
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::TokenInvalid.category(), ErrorCategory::Auth);
        assert_eq!(ErrorCode::InvalidCpid.category(), ErrorCategory::Reward);
        assert_eq!(
            ErrorCode::CatalogEntryNotFound.category(),
            ErrorCategory::Catalog
        );
        assert_eq!(ErrorCode::InternalError.category(), ErrorCategory::System);
    }

    #[test]
    fn test_category_serialize() {
        let json = serde_json::to_string(&ErrorCategory::Reward).unwrap();
        assert_eq!(json, "\"reward\"");
        let category: ErrorCategory = serde_json::from_str("\"catalog\"").unwrap();
        assert_eq!(category, ErrorCategory::Catalog);
    }
}
