//! Admin dashboard handlers

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use shared::{
    current_year, AnalyzeDashboardRequest, DashboardAnalysis, DashboardFilter, IncomeByDateRange,
};

use crate::error::{AppError, AppResult};
use crate::services::{AnalysisService, DashboardService};
use crate::AppState;

#[derive(Deserialize)]
pub struct DashboardQuery {
    pub month: Option<String>,
    pub year: Option<String>,
    pub category: Option<String>,
    pub format: Option<String>, // "json" or "csv"
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeRangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Get dashboard summary
pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> AppResult<impl IntoResponse> {
    let filter = DashboardFilter::from_query(
        query.month.as_deref(),
        query.year.as_deref(),
        query.category.as_deref(),
        current_year(),
    );

    let service = DashboardService::new(state.db.clone(), &state.config.dashboard);
    let summary = service.get_dashboard(filter).await?;

    if query.format.as_deref() == Some("csv") {
        let csv = DashboardService::export_series_csv(&summary.monthly_income)?;
        Ok((
            [
                (header::CONTENT_TYPE, "text/csv"),
                (header::CONTENT_DISPOSITION, "attachment; filename=\"dashboard_income.csv\""),
            ],
            csv,
        )
            .into_response())
    } else {
        Ok(Json(summary).into_response())
    }
}

/// Generate an AI analysis of dashboard figures
pub async fn analyze_dashboard(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeDashboardRequest>, JsonRejection>,
) -> AppResult<Json<DashboardAnalysis>> {
    let service = AnalysisService::new(state.gemini.as_ref());
    service.ensure_configured()?;

    let Json(request) = payload.map_err(|e| AppError::ValidationError(e.body_text()))?;
    let analysis = service.analyze(request).await?;
    Ok(Json(analysis))
}

/// Get income between two dates
pub async fn get_income_by_date_range(
    State(state): State<AppState>,
    Query(query): Query<IncomeRangeQuery>,
) -> AppResult<Json<IncomeByDateRange>> {
    let service = DashboardService::new(state.db.clone(), &state.config.dashboard);
    let income = service
        .get_income_by_date_range(
            query.start_date.unwrap_or_default(),
            query.end_date.unwrap_or_default(),
        )
        .await?;
    Ok(Json(income))
}
