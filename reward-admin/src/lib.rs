//! reward-admin: rewards catalog administration service
//!
//! - Offers and gift cards grouped by CPID family
//! - Per-source items with their own status, rebate and inventory
//! - Client catalog assignment and ordering
//! - Admin JWT authentication with permission gates

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod flags;
pub mod state;
pub mod validation;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub use api::build_router;
pub use config::Config;
pub use state::AppState;
