//! Route definitions for the bookstore dashboard API

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/dashboard", dashboard_routes())
}

/// Admin dashboard routes
fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::get_dashboard))
        .route("/analyze", post(handlers::analyze_dashboard))
        .route("/income", get(handlers::get_income_by_date_range))
}
