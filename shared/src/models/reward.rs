//! Reward Models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::reward::RewardStatus;

/// Numeric field that clients may send as a number or a string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberOrText {
    Number(serde_json::Number),
    Text(String),
}

impl NumberOrText {
    pub fn as_text(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

impl Default for NumberOrText {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

/// Create offer payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferCreate {
    pub brand_name: String,
    /// Defaults to `EN`
    pub language: Option<String>,
    pub value: Decimal,
    pub source_name: String,
    pub rebate_percentage: Decimal,
    /// `None` = unlimited
    pub inventory: Option<i32>,
    /// Defaults to `AVAILABLE`
    pub reward_availability: Option<String>,
    /// Defaults to `active`; `suspended` is rejected
    pub status: Option<RewardStatus>,
}

/// Family-wide update payload (applied to every live item)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RewardUpdate {
    pub rebate_percentage: Option<Decimal>,
    pub inventory: Option<i32>,
    pub reward_availability: Option<String>,
    pub status: Option<RewardStatus>,
}

/// Additional source item for an existing family
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceItemCreate {
    pub source_name: String,
    pub rebate_percentage: Decimal,
    pub inventory: Option<i32>,
    pub reward_availability: Option<String>,
    pub status: Option<RewardStatus>,
}

/// Single item status change
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ItemStatusUpdate {
    pub status: RewardStatus,
}

/// CPID preview request (create-offer wizard)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CpidPreviewRequest {
    pub brand_name: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub value: NumberOrText,
}

/// CPID preview response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CpidPreview {
    pub cpid: String,
    pub exact_cpid: String,
    pub brand_slug: String,
    pub language: String,
    pub value: String,
}

/// Query for reward listing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RewardListQuery {
    /// Evaluate `is_enabled` against this client's catalog
    pub client_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_or_text() {
        let req: CpidPreviewRequest =
            serde_json::from_str(r#"{"brand_name":"Acme Health","value":10.4}"#).unwrap();
        assert_eq!(req.value.as_text(), "10.4");

        let req: CpidPreviewRequest =
            serde_json::from_str(r#"{"brand_name":"Acme Health","value":"25"}"#).unwrap();
        assert_eq!(req.value.as_text(), "25");

        let req: CpidPreviewRequest =
            serde_json::from_str(r#"{"brand_name":"Acme Health"}"#).unwrap();
        assert_eq!(req.value.as_text(), "");
        assert!(req.language.is_none());
    }

    #[test]
    fn test_offer_create_status() {
        let req: OfferCreate = serde_json::from_str(
            r#"{"brand_name":"Acme Health","value":"10","source_name":"Tango",
                "rebate_percentage":2.5,"status":"suspended"}"#,
        )
        .unwrap();
        assert_eq!(req.status, Some(RewardStatus::Suspended));
        assert_eq!(req.value, Decimal::new(10, 0));
        assert!(req.inventory.is_none());
    }
}
