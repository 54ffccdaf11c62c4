//! Top-product ranking across sales channels

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Quantity and revenue sold for one book, in one channel or merged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSales {
    pub book_id: Uuid,
    pub quantity: i64,
    pub revenue: Decimal,
}

impl ProductSales {
    pub fn new(book_id: Uuid, quantity: i64, revenue: Decimal) -> Self {
        Self {
            book_id,
            quantity,
            revenue,
        }
    }
}

/// Merge online and in-store totals into one entry per book.
///
/// Overlapping books have their quantities and revenues summed. The result is
/// ordered by book id.
pub fn merge_channel_sales(online: &[ProductSales], in_store: &[ProductSales]) -> Vec<ProductSales> {
    let mut combined: HashMap<Uuid, ProductSales> = HashMap::new();

    for sales in online.iter().chain(in_store) {
        combined
            .entry(sales.book_id)
            .and_modify(|existing| {
                existing.quantity += sales.quantity;
                existing.revenue += sales.revenue;
            })
            .or_insert(*sales);
    }

    let mut merged: Vec<ProductSales> = combined.into_values().collect();
    merged.sort_by_key(|sales| sales.book_id);
    merged
}

/// Keep the `limit` best sellers by quantity, highest first.
///
/// Ties are broken by book id so the ranking is stable between requests.
pub fn rank_top_products(mut merged: Vec<ProductSales>, limit: usize) -> Vec<ProductSales> {
    merged.sort_by(|a, b| {
        b.quantity
            .cmp(&a.quantity)
            .then_with(|| a.book_id.cmp(&b.book_id))
    });
    merged.truncate(limit);
    merged
}
