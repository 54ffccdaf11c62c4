//! Shared types and computation for the bookstore dashboard
//!
//! This crate holds the dashboard payloads and the pure parts of the
//! reporting logic (calendar buckets, channel merging, number formatting) so
//! they can be tested without a database.

pub mod models;
pub mod period;
pub mod ranking;
pub mod types;
pub mod validation;

pub use models::*;
pub use period::*;
pub use ranking::*;
pub use types::*;
pub use validation::*;
