//! Client Catalog Models

use serde::{Deserialize, Serialize};

use crate::reward::RewardStatus;
use crate::types::Timestamp;

/// Registry linkage of one reward item into a client catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: i64,
    pub client_id: String,
    pub item_id: i64,
    pub cpid: String,
    pub exact_cpid: String,
    pub brand_name: String,
    pub status: RewardStatus,
    pub sort_order: i32,
    pub created_at: Timestamp,
}

/// Assign items to a catalog (appended at the end)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignRequest {
    pub item_ids: Vec<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOrderItem {
    pub item_id: i64,
    pub sort_order: i32,
}

/// Drag-and-drop order of a catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderRequest {
    pub items: Vec<SortOrderItem>,
}
