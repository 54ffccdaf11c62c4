//! Domain models for the bookstore dashboard

mod catalog;
mod dashboard;

pub use catalog::*;
pub use dashboard::*;
