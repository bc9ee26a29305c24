//! Database access layer
//!
//! Raw SQL over the PostgreSQL pool. Every read that feeds the status mapper
//! filters `is_deleted = 0`.

pub mod catalogs;
pub mod rewards;

pub(crate) use crate::BoxError;
