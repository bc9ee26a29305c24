//! Request / response models
//!
//! Explicit payload structs for every admin endpoint. Row types live in the
//! service's `db` module; these are the shapes exchanged over HTTP.

pub mod catalog;
pub mod reward;

// Re-exports
pub use catalog::*;
pub use reward::*;
