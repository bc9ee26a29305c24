//! Admin authentication and permission gates

pub mod admin_auth;
pub mod permissions;

pub use admin_auth::{AdminIdentity, admin_auth_middleware, create_token};
