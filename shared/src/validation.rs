//! Validation utilities for dashboard requests
//!
//! Query filters are parsed leniently: bad values fall back to defaults
//! instead of failing the request. Analysis bodies are checked strictly
//! before any figures reach the prompt.

use std::borrow::Cow;

use rust_decimal::Decimal;
use validator::ValidationError;

use crate::models::{IncomeBucketSummary, TopProductSummary};

/// Years outside this range fall back to the current year
pub const MIN_YEAR: i32 = 1;
pub const MAX_YEAR: i32 = 9999;

/// Longest series label accepted in an analysis request
pub const MAX_LABEL_CHARS: usize = 16;

// ============================================================================
// Query Filters
// ============================================================================

/// Parse a 1-12 month. Anything else selects the yearly view.
pub fn parse_month(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|value| value.trim().parse::<u32>().ok())
        .filter(|month| (1..=12).contains(month))
}

/// Parse a calendar year, falling back when missing or unusable
pub fn parse_year(raw: Option<&str>, fallback: i32) -> i32 {
    raw.and_then(|value| value.trim().parse::<i32>().ok())
        .filter(|year| (MIN_YEAR..=MAX_YEAR).contains(year))
        .unwrap_or(fallback)
}

/// An empty category means no filter
pub fn parse_category(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

// ============================================================================
// Analysis Request
// ============================================================================

fn invalid(code: &'static str, message: String) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::from(message));
    error
}

/// Money figures submitted for analysis cannot be negative
pub fn validate_non_negative_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(invalid("negative_amount", format!("amount {} cannot be negative", amount)));
    }
    Ok(())
}

pub fn validate_top_products(products: &[TopProductSummary]) -> Result<(), ValidationError> {
    for (index, product) in products.iter().enumerate() {
        if product.total_sold < 0 {
            return Err(invalid(
                "negative_quantity",
                format!("topProducts[{}].totalSold cannot be negative", index),
            ));
        }
        validate_non_negative_amount(&product.total_revenue).map_err(|_| {
            invalid(
                "negative_amount",
                format!("topProducts[{}].totalRevenue cannot be negative", index),
            )
        })?;
    }
    Ok(())
}

pub fn validate_income_series(series: &[IncomeBucketSummary]) -> Result<(), ValidationError> {
    for (index, bucket) in series.iter().enumerate() {
        let label_chars = bucket.month.chars().count();
        if label_chars == 0 || label_chars > MAX_LABEL_CHARS {
            return Err(invalid(
                "invalid_label",
                format!("monthlyIncome[{}].month must be 1-{} characters", index, MAX_LABEL_CHARS),
            ));
        }
        for (field, amount) in [
            ("onlineIncome", &bucket.online_income),
            ("saleIncome", &bucket.sale_income),
            ("income", &bucket.income),
        ] {
            validate_non_negative_amount(amount).map_err(|_| {
                invalid(
                    "negative_amount",
                    format!("monthlyIncome[{}].{} cannot be negative", index, field),
                )
            })?;
        }
    }
    Ok(())
}
