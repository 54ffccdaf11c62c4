//! Store catalog and order models read by the dashboard

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Order status that excludes an order from income totals
pub const CANCELLED_ORDER_STATUS: &str = "cancel";

/// A book in the store catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: Uuid,
    pub name: String,
    pub image: Option<String>,
    pub category: Option<String>,
    pub price: Decimal,
}
