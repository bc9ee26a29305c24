//! Shared types for the rewards catalog
//!
//! Domain types and pure logic used by the admin service and its clients:
//! error codes, reward models, the CPID codec, the status mapper and
//! grouped-reward aggregation.

pub mod error;
pub mod models;
pub mod reward;
pub mod types;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use reward::{GroupedReward, PersistedStatus, RewardStatus, StatusPatch};
