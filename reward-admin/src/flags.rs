//! Feature flags
//!
//! Read once at start-up and carried in [`AppState`](crate::state::AppState);
//! handlers receive them explicitly.

use serde::{Deserialize, Serialize};
use shared::error::AppError;

/// Feature switches for the admin surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlags {
    /// Create-offer wizard
    pub offer_creation: bool,
    /// Attaching more than one source to a reward
    pub multi_source: bool,
    /// Drag-and-drop catalog ordering
    pub catalog_reordering: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            offer_creation: true,
            multi_source: true,
            catalog_reordering: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    OfferCreation,
    MultiSource,
    CatalogReordering,
}

impl Feature {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OfferCreation => "offer_creation",
            Self::MultiSource => "multi_source",
            Self::CatalogReordering => "catalog_reordering",
        }
    }

    fn env_key(&self) -> &'static str {
        match self {
            Self::OfferCreation => "FEATURE_OFFER_CREATION",
            Self::MultiSource => "FEATURE_MULTI_SOURCE",
            Self::CatalogReordering => "FEATURE_CATALOG_REORDERING",
        }
    }
}

impl FeatureFlags {
    pub fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let read = |feature: Feature, default: bool| {
            let key = feature.env_key();
            match lookup(key) {
                None => default,
                Some(raw) => parse_switch(&raw).unwrap_or_else(|| {
                    tracing::warn!(key, value = %raw, "Unrecognised feature switch, using default");
                    default
                }),
            }
        };

        Self {
            offer_creation: read(Feature::OfferCreation, defaults.offer_creation),
            multi_source: read(Feature::MultiSource, defaults.multi_source),
            catalog_reordering: read(Feature::CatalogReordering, defaults.catalog_reordering),
        }
    }

    pub fn is_enabled(&self, feature: Feature) -> bool {
        match feature {
            Feature::OfferCreation => self.offer_creation,
            Feature::MultiSource => self.multi_source,
            Feature::CatalogReordering => self.catalog_reordering,
        }
    }

    /// `FeatureNotAvailable` when `feature` is switched off
    pub fn ensure(&self, feature: Feature) -> Result<(), AppError> {
        if self.is_enabled(feature) {
            Ok(())
        } else {
            Err(AppError::feature_disabled(feature.as_str()))
        }
    }
}

fn parse_switch(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::error::ErrorCode;

    #[test]
    fn test_parse_switch() {
        assert_eq!(parse_switch("ON"), Some(true));
        assert_eq!(parse_switch(" 0 "), Some(false));
        assert_eq!(parse_switch("False"), Some(false));
        assert_eq!(parse_switch("maybe"), None);
    }

    #[test]
    fn test_from_lookup() {
        let flags = FeatureFlags::from_lookup(&|key: &str| match key {
            "FEATURE_CATALOG_REORDERING" => Some("false".to_string()),
            "FEATURE_MULTI_SOURCE" => Some("garbage".to_string()),
            _ => None,
        });
        assert!(flags.offer_creation);
        assert!(flags.multi_source);
        assert!(!flags.catalog_reordering);
    }

    #[test]
    fn test_ensure() {
        let flags = FeatureFlags {
            multi_source: false,
            ..FeatureFlags::default()
        };
        assert!(flags.ensure(Feature::OfferCreation).is_ok());
        let err = flags.ensure(Feature::MultiSource).unwrap_err();
        assert_eq!(err.code, ErrorCode::FeatureNotAvailable);
        assert_eq!(err.details.unwrap().get("feature").unwrap(), "multi_source");
    }
}
