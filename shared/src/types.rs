//! Common types for the shared crate

use serde::{Deserialize, Serialize};

/// Timestamp type (Unix milliseconds)
pub type Timestamp = i64;

/// Superuser permission, grants every action
pub const PERMISSION_ALL: &str = "all";

/// Permission type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission(pub String);

impl Permission {
    /// Check if this permission grants access to the given resource action
    pub fn grants(&self, action: &str) -> bool {
        if self.0 == "*" || self.0 == PERMISSION_ALL {
            return true;
        }
        if let Some(prefix) = self.0.strip_suffix(":*") {
            return action
                .split_once(':')
                .is_some_and(|(resource, _)| resource == prefix);
        }
        self.0 == action
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Permission {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
