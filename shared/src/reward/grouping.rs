//! Grouped rewards
//!
//! A logical reward is never stored on its own: it is folded on every read
//! from the source items sharing one exact CPID.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::cpid;
use super::status::RewardStatus;
use crate::types::Timestamp;

/// Availability reported when source items disagree
pub const MIXED_AVAILABILITY: &str = "mixed";

/// Reward kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardKind {
    Offer,
    GiftCard,
}

impl RewardKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Offer => "offer",
            Self::GiftCard => "gift_card",
        }
    }
}

impl fmt::Display for RewardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RewardKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "offer" => Ok(Self::Offer),
            "gift_card" => Ok(Self::GiftCard),
            other => Err(format!("unknown reward kind '{other}'")),
        }
    }
}

/// One source item of a reward (a CPIDx row)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardItem {
    pub id: i64,
    /// Full CPID including the random or source-letter suffix
    pub cpid: String,
    pub kind: RewardKind,
    pub brand_name: String,
    pub language: String,
    pub value: Decimal,
    pub source_name: String,
    pub rebate_percentage: Decimal,
    /// `None` = unlimited
    pub inventory: Option<i32>,
    pub reward_availability: String,
    pub status: RewardStatus,
    /// Catalog linkage id when the item is registered for the requesting client
    pub registry_id: Option<i64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Read-time aggregate of every source item in one CPID family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedReward {
    pub exact_cpid: String,
    pub kind: RewardKind,
    pub brand_name: String,
    pub language: String,
    pub value: Decimal,
    pub reward_status: RewardStatus,
    pub reward_availability: String,
    pub source_count: usize,
    pub is_enabled: bool,
    pub items: Vec<RewardItem>,
}

impl GroupedReward {
    /// Fold `items` into one reward. Family-wide fields come from the first item.
    ///
    /// Returns `None` for an empty family.
    pub fn from_items(exact_cpid: impl Into<String>, items: Vec<RewardItem>) -> Option<Self> {
        let first = items.first()?;
        let statuses: Vec<RewardStatus> = items.iter().map(|i| i.status).collect();
        Some(Self {
            exact_cpid: exact_cpid.into(),
            kind: first.kind,
            brand_name: first.brand_name.clone(),
            language: first.language.clone(),
            value: first.value,
            reward_status: aggregate_status(&statuses),
            reward_availability: aggregate_availability(
                items.iter().map(|i| i.reward_availability.as_str()),
            ),
            source_count: items.len(),
            is_enabled: items.iter().any(|i| i.registry_id.is_some()),
            items,
        })
    }
}

/// Any active item makes the reward active; only an all-suspended family is
/// suspended; everything else is inactive.
pub fn aggregate_status(statuses: &[RewardStatus]) -> RewardStatus {
    if statuses.contains(&RewardStatus::Active) {
        RewardStatus::Active
    } else if !statuses.is_empty() && statuses.iter().all(|s| *s == RewardStatus::Suspended) {
        RewardStatus::Suspended
    } else {
        RewardStatus::Inactive
    }
}

/// The shared availability, or [`MIXED_AVAILABILITY`] when items disagree.
pub fn aggregate_availability<'a>(values: impl IntoIterator<Item = &'a str>) -> String {
    let mut iter = values.into_iter();
    let Some(first) = iter.next() else {
        return String::new();
    };
    if iter.all(|v| v == first) {
        first.to_string()
    } else {
        MIXED_AVAILABILITY.to_string()
    }
}

/// Group a flat item list by exact CPID, keeping first-seen family order.
pub fn group_items(items: Vec<RewardItem>) -> Vec<GroupedReward> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut families: Vec<(String, Vec<RewardItem>)> = Vec::new();

    for item in items {
        let exact = cpid::truncate(&item.cpid);
        match index.get(&exact) {
            Some(&pos) => families[pos].1.push(item),
            None => {
                index.insert(exact.clone(), families.len());
                families.push((exact, vec![item]));
            }
        }
    }

    families
        .into_iter()
        .filter_map(|(exact, items)| GroupedReward::from_items(exact, items))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i64, cpid: &str, status: RewardStatus, availability: &str) -> RewardItem {
        RewardItem {
            id,
            cpid: cpid.to_string(),
            kind: RewardKind::Offer,
            brand_name: "Acme Health".to_string(),
            language: "EN".to_string(),
            value: Decimal::new(10, 0),
            source_name: format!("source-{id}"),
            rebate_percentage: Decimal::new(25, 1),
            inventory: None,
            reward_availability: availability.to_string(),
            status,
            registry_id: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_any_active_wins() {
        use RewardStatus::*;
        assert_eq!(aggregate_status(&[Suspended, Active, Suspended]), Active);
    }

    #[test]
    fn test_all_suspended() {
        use RewardStatus::*;
        assert_eq!(aggregate_status(&[Suspended, Suspended]), Suspended);
    }

    #[test]
    fn test_default_inactive() {
        use RewardStatus::*;
        assert_eq!(aggregate_status(&[Inactive, Suspended]), Inactive);
        assert_eq!(aggregate_status(&[]), Inactive);
    }

    #[test]
    fn test_availability_mixing() {
        assert_eq!(
            aggregate_availability(["AVAILABLE", "AVAILABLE"]),
            "AVAILABLE"
        );
        assert_eq!(
            aggregate_availability(["AVAILABLE", "UNAVAILABLE"]),
            MIXED_AVAILABILITY
        );
    }

    #[test]
    fn test_from_items_derives_fields() {
        let mut linked = item(2, "OC-ACMEHEALTH-EN-10-A", RewardStatus::Suspended, "AVAILABLE");
        linked.registry_id = Some(77);
        let items = vec![
            item(1, "OC-ACMEHEALTH-EN-10-K3Q9ZB", RewardStatus::Inactive, "AVAILABLE"),
            linked,
        ];

        let grouped = GroupedReward::from_items("OC-ACMEHEALTH-EN-10", items).unwrap();
        assert_eq!(grouped.source_count, 2);
        assert_eq!(grouped.reward_status, RewardStatus::Inactive);
        assert_eq!(grouped.reward_availability, "AVAILABLE");
        assert!(grouped.is_enabled);
        assert_eq!(grouped.value, Decimal::new(10, 0));
    }

    #[test]
    fn test_not_enabled_without_linkage() {
        let items = vec![item(1, "OC-ACMEHEALTH-EN-10-K3Q9ZB", RewardStatus::Active, "AVAILABLE")];
        let grouped = GroupedReward::from_items("OC-ACMEHEALTH-EN-10", items).unwrap();
        assert!(!grouped.is_enabled);
        assert_eq!(grouped.reward_status, RewardStatus::Active);
    }

    #[test]
    fn test_empty_family() {
        assert!(GroupedReward::from_items("OC-ACMEHEALTH-EN-10", vec![]).is_none());
    }

    #[test]
    fn test_group_items_keeps_family_order() {
        let items = vec![
            item(1, "OC-ZETAFOODS-EN-5-AAAAAA", RewardStatus::Active, "AVAILABLE"),
            item(2, "OC-ACMEHEALTH-EN-10-BBBBBB", RewardStatus::Suspended, "AVAILABLE"),
            item(3, "OC-ZETAFOODS-EN-5-A", RewardStatus::Inactive, "UNAVAILABLE"),
            item(4, "OC-ACMEHEALTH-EN-10-A", RewardStatus::Suspended, "AVAILABLE"),
        ];

        let groups = group_items(items);
        assert_eq!(groups.len(), 2);

        assert_eq!(groups[0].exact_cpid, "OC-ZETAFOODS-EN-5");
        assert_eq!(groups[0].source_count, 2);
        assert_eq!(groups[0].reward_status, RewardStatus::Active);
        assert_eq!(groups[0].reward_availability, MIXED_AVAILABILITY);

        assert_eq!(groups[1].exact_cpid, "OC-ACMEHEALTH-EN-10");
        assert_eq!(groups[1].reward_status, RewardStatus::Suspended);
        assert_eq!(groups[1].items[1].id, 4);
    }

    #[test]
    fn test_reward_kind_serde() {
        let json = serde_json::to_string(&RewardKind::GiftCard).unwrap();
        assert_eq!(json, "\"gift_card\"");
        assert_eq!("offer".parse::<RewardKind>(), Ok(RewardKind::Offer));
        assert!("voucher".parse::<RewardKind>().is_err());
    }
}
