//! Admin dashboard payloads
//!
//! Field names are camelCase on the wire to match what the dashboard
//! frontend charts expect.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::Book;
use crate::period::SeriesPeriod;
use crate::ranking::ProductSales;
use crate::validation::{
    parse_category, parse_month, parse_year, validate_income_series, validate_non_negative_amount,
    validate_top_products,
};

/// Filters applied to a dashboard request, echoed back as `selectedFilters`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardFilter {
    pub month: Option<u32>,
    pub year: i32,
    pub category: Option<String>,
}

impl DashboardFilter {
    /// Build the filter from raw query values, falling back to defaults for
    /// anything missing or malformed.
    pub fn from_query(
        month: Option<&str>,
        year: Option<&str>,
        category: Option<&str>,
        current_year: i32,
    ) -> Self {
        Self {
            month: parse_month(month),
            year: parse_year(year, current_year),
            category: parse_category(category),
        }
    }

    pub fn period(&self) -> SeriesPeriod {
        SeriesPeriod::new(self.year, self.month)
    }
}

/// One entry of the income chart (a day or a month)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeBucket {
    /// Day number or Thai month abbreviation
    pub month: String,
    pub online_income: Decimal,
    pub sale_income: Decimal,
    pub income: Decimal,
    pub year: i32,
}

impl IncomeBucket {
    pub fn new(label: impl Into<String>, year: i32, online_income: Decimal, sale_income: Decimal) -> Self {
        Self {
            month: label.into(),
            online_income,
            sale_income,
            income: online_income + sale_income,
            year,
        }
    }
}

/// A best-selling book with its catalog details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopProduct {
    pub id: Uuid,
    pub name: String,
    pub image: Option<String>,
    pub category: String,
    pub price: Decimal,
    pub total_sold: i64,
    pub total_revenue: Decimal,
}

impl TopProduct {
    /// Attach catalog details to ranked sales. A book missing from the catalog
    /// keeps its sales figures with empty details.
    pub fn from_sales(sales: &ProductSales, book: Option<&Book>) -> Self {
        Self {
            id: sales.book_id,
            name: book.map(|b| b.name.clone()).unwrap_or_default(),
            image: book.and_then(|b| b.image.clone()),
            category: book.and_then(|b| b.category.clone()).unwrap_or_default(),
            price: book.map(|b| b.price).unwrap_or(Decimal::ZERO),
            total_sold: sales.quantity,
            total_revenue: sales.revenue,
        }
    }
}

/// Store-wide totals shown on the summary cards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DashboardTotals {
    pub total_order: i64,
    pub total_member: i64,
    pub total_income: Decimal,
    pub total_sale_count: i64,
    pub total_sale_income: Decimal,
}

/// Full dashboard response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_order: i64,
    pub total_income: Decimal,
    pub total_sale_count: i64,
    pub total_sale_income: Decimal,
    pub total_all_income: Decimal,
    pub total_member: i64,
    pub monthly_income: Vec<IncomeBucket>,
    pub top_products: Vec<TopProduct>,
    pub categories: Vec<String>,
    pub selected_filters: DashboardFilter,
}

impl DashboardSummary {
    pub fn assemble(
        totals: DashboardTotals,
        monthly_income: Vec<IncomeBucket>,
        top_products: Vec<TopProduct>,
        categories: Vec<String>,
        selected_filters: DashboardFilter,
    ) -> Self {
        Self {
            total_order: totals.total_order,
            total_income: totals.total_income,
            total_sale_count: totals.total_sale_count,
            total_sale_income: totals.total_sale_income,
            total_all_income: totals.total_income + totals.total_sale_income,
            total_member: totals.total_member,
            monthly_income,
            top_products,
            categories,
            selected_filters,
        }
    }
}

/// Income between two dates, both channels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeByDateRange {
    pub online_income: Decimal,
    pub sale_income: Decimal,
    pub total_income: Decimal,
    pub start_date: String,
    pub end_date: String,
}

impl IncomeByDateRange {
    pub fn new(online_income: Decimal, sale_income: Decimal, start_date: String, end_date: String) -> Self {
        Self {
            online_income,
            sale_income,
            total_income: online_income + sale_income,
            start_date,
            end_date,
        }
    }
}

/// Dashboard figures submitted for AI analysis.
///
/// Accepts the `DashboardSummary` shape; fields the analysis does not use are
/// ignored.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeDashboardRequest {
    /// Missing or `null` is treated as zero
    #[serde(default)]
    #[validate(custom = "validate_non_negative_amount")]
    pub total_all_income: Option<Decimal>,

    #[serde(default)]
    #[validate(length(max = 100), custom = "validate_top_products")]
    pub top_products: Option<Vec<TopProductSummary>>,

    #[serde(default)]
    #[validate(length(max = 366), custom = "validate_income_series")]
    pub monthly_income: Option<Vec<IncomeBucketSummary>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopProductSummary {
    pub name: String,
    pub total_sold: i64,
    pub total_revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeBucketSummary {
    pub month: String,
    pub online_income: Decimal,
    pub sale_income: Decimal,
    pub income: Decimal,
}

/// Generated commentary returned by the analysis endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardAnalysis {
    pub analysis: String,
}
