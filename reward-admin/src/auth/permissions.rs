//! Permission names checked by the admin API

/// Read rewards and catalogs
pub const REWARDS_VIEW: &str = "rewards:view";
/// Create/update rewards and their source items
pub const REWARDS_MANAGE: &str = "rewards:manage";
/// Assign, remove and reorder catalog entries
pub const CATALOGS_MANAGE: &str = "catalogs:manage";
