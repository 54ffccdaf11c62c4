//! Business logic services for the bookstore dashboard

pub mod analysis;
pub mod dashboard;

pub use analysis::AnalysisService;
pub use dashboard::DashboardService;
