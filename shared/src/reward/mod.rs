//! Reward domain logic
//!
//! - [`cpid`]: building and reading CPID identifiers
//! - [`status`]: three-state status <-> legacy column mapping
//! - [`grouping`]: per-source items folded into one grouped reward

pub mod cpid;
pub mod grouping;
pub mod status;

pub use cpid::{CpidError, CpidParts};
pub use grouping::{GroupedReward, MIXED_AVAILABILITY, RewardItem, RewardKind};
pub use status::{
    PersistedStatus, RewardStatus, StatusError, StatusPatch, StatusTarget, UnknownStatus,
};
