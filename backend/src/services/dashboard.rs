//! Dashboard reporting service
//! Provides summary cards, the income chart series, top products, and
//! income by date range for the admin dashboard

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tokio::sync::Semaphore;
use uuid::Uuid;

use shared::{
    merge_channel_sales, parse_range_bounds, rank_top_products, Book, DashboardFilter,
    DashboardSummary, DashboardTotals, IncomeBucket, IncomeByDateRange, ProductSales, TopProduct,
    CANCELLED_ORDER_STATUS,
};

use crate::config::DashboardConfig;
use crate::error::{AppError, AppResult};

/// Dashboard service
#[derive(Clone)]
pub struct DashboardService {
    db: PgPool,
    max_concurrent_buckets: usize,
    top_products_limit: usize,
}

/// Book columns needed for the top products list
#[derive(Debug, sqlx::FromRow)]
struct BookRow {
    id: Uuid,
    name: String,
    image: Option<String>,
    category: Option<String>,
    price: Decimal,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Book {
            id: row.id,
            name: row.name,
            image: row.image,
            category: row.category,
            price: row.price,
        }
    }
}

impl DashboardService {
    pub fn new(db: PgPool, config: &DashboardConfig) -> Self {
        Self {
            db,
            max_concurrent_buckets: config.max_concurrent_buckets.max(1),
            top_products_limit: config.top_products_limit,
        }
    }

    /// Build the full dashboard for the given filters
    pub async fn get_dashboard(&self, filter: DashboardFilter) -> AppResult<DashboardSummary> {
        let (totals, categories) = self.get_totals().await?;
        let monthly_income = self.get_income_series(&filter).await?;
        let top_products = self.get_top_products(filter.category.as_deref()).await?;

        Ok(DashboardSummary::assemble(
            totals,
            monthly_income,
            top_products,
            categories,
            filter,
        ))
    }

    /// Store-wide totals and the category list, queried together
    async fn get_totals(&self) -> AppResult<(DashboardTotals, Vec<String>)> {
        let (total_order, total_member, total_income, total_sale_count, total_sale_income, categories) = tokio::try_join!(
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM orders").fetch_one(&self.db),
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM members").fetch_one(&self.db),
            sqlx::query_scalar::<_, Option<Decimal>>(
                r#"
                SELECT SUM(od.price)
                FROM order_details od
                JOIN orders o ON o.id = od.order_id
                WHERE o.status <> $1
                "#,
            )
            .bind(CANCELLED_ORDER_STATUS)
            .fetch_one(&self.db),
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM sales").fetch_one(&self.db),
            sqlx::query_scalar::<_, Option<Decimal>>("SELECT SUM(total) FROM sales")
                .fetch_one(&self.db),
            sqlx::query_scalar::<_, String>(
                r#"
                SELECT DISTINCT category
                FROM books
                WHERE category IS NOT NULL
                ORDER BY category
                "#,
            )
            .fetch_all(&self.db),
        )?;

        let totals = DashboardTotals {
            total_order,
            total_member,
            total_income: total_income.unwrap_or(Decimal::ZERO),
            total_sale_count,
            total_sale_income: total_sale_income.unwrap_or(Decimal::ZERO),
        };
        Ok((totals, categories))
    }

    /// Income per day of the selected month, or per month of the selected year
    async fn get_income_series(&self, filter: &DashboardFilter) -> AppResult<Vec<IncomeBucket>> {
        let period = filter.period();
        let buckets = period.buckets()?;
        tracing::debug!(
            ?period,
            buckets = buckets.len(),
            category = ?filter.category,
            "Querying income series"
        );

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_buckets));
        let mut handles = Vec::with_capacity(buckets.len());

        for bucket in buckets {
            let db = self.db.clone();
            let category = filter.category.clone();
            let semaphore = semaphore.clone();
            handles.push(tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| AppError::Internal(format!("Semaphore error: {}", e)))?;

                let (online, sale) = tokio::try_join!(
                    bucket_online_income(&db, bucket.start, bucket.end, category.as_deref()),
                    bucket_sale_income(&db, bucket.start, bucket.end, category.as_deref()),
                )?;
                Ok::<_, AppError>((bucket.label, online, sale))
            }));
        }

        let year = period.year();
        let mut series = Vec::with_capacity(handles.len());
        for handle in handles {
            let (label, online, sale) = handle.await.map_err(anyhow::Error::from)??;
            series.push(IncomeBucket::new(label, year, online, sale));
        }
        Ok(series)
    }

    /// Best sellers across both channels, with catalog details
    async fn get_top_products(&self, category: Option<&str>) -> AppResult<Vec<TopProduct>> {
        let (online, in_store) = tokio::try_join!(
            sqlx::query_as::<_, (Uuid, Option<i64>, Option<Decimal>)>(
                r#"
                SELECT od.book_id, SUM(od.qty)::BIGINT, SUM(od.price)
                FROM order_details od
                JOIN orders o ON o.id = od.order_id
                LEFT JOIN books b ON b.id = od.book_id
                WHERE o.status <> $1
                  AND ($2::TEXT IS NULL OR b.category = $2)
                GROUP BY od.book_id
                "#,
            )
            .bind(CANCELLED_ORDER_STATUS)
            .bind(category)
            .fetch_all(&self.db),
            sqlx::query_as::<_, (Uuid, Option<i64>, Option<Decimal>)>(
                r#"
                SELECT sd.book_id, SUM(sd.qty)::BIGINT, SUM(sd.price)
                FROM sale_details sd
                LEFT JOIN books b ON b.id = sd.book_id
                WHERE ($1::TEXT IS NULL OR b.category = $1)
                GROUP BY sd.book_id
                "#,
            )
            .bind(category)
            .fetch_all(&self.db),
        )?;

        let merged = merge_channel_sales(&to_product_sales(online), &to_product_sales(in_store));
        let ranked = rank_top_products(merged, self.top_products_limit);
        if ranked.is_empty() {
            return Ok(Vec::new());
        }

        let book_ids: Vec<Uuid> = ranked.iter().map(|p| p.book_id).collect();
        let books: HashMap<Uuid, Book> = sqlx::query_as::<_, BookRow>(
            r#"
            SELECT id, name, image, category, price
            FROM books
            WHERE id = ANY($1)
            "#,
        )
        .bind(&book_ids)
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .map(|row| (row.id, Book::from(row)))
        .collect();

        Ok(ranked
            .iter()
            .map(|sales| TopProduct::from_sales(sales, books.get(&sales.book_id)))
            .collect())
    }

    /// Online and in-store income between two inclusive bounds
    pub async fn get_income_by_date_range(
        &self,
        start_date: String,
        end_date: String,
    ) -> AppResult<IncomeByDateRange> {
        let (start, end) = parse_range_bounds(&start_date, &end_date)?;

        let (online, sale) = tokio::try_join!(
            sqlx::query_scalar::<_, Option<Decimal>>(
                r#"
                SELECT SUM(od.price)
                FROM order_details od
                JOIN orders o ON o.id = od.order_id
                WHERE o.status <> $1
                  AND o.created_at >= $2
                  AND o.created_at <= $3
                "#,
            )
            .bind(CANCELLED_ORDER_STATUS)
            .bind(start)
            .bind(end)
            .fetch_one(&self.db),
            sqlx::query_scalar::<_, Option<Decimal>>(
                r#"
                SELECT SUM(total)
                FROM sales
                WHERE created_at >= $1
                  AND created_at <= $2
                "#,
            )
            .bind(start)
            .bind(end)
            .fetch_one(&self.db),
        )?;

        Ok(IncomeByDateRange::new(
            online.unwrap_or(Decimal::ZERO),
            sale.unwrap_or(Decimal::ZERO),
            start_date,
            end_date,
        ))
    }

    /// Export the income series as CSV
    pub fn export_series_csv(series: &[IncomeBucket]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for bucket in series {
            wtr.serialize(bucket)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let csv_data = String::from_utf8(
            wtr.into_inner()
                .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?,
        )
        .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))?;
        Ok(csv_data)
    }
}

/// Online income for one bucket, `[start, end)`
async fn bucket_online_income(
    db: &PgPool,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    category: Option<&str>,
) -> AppResult<Decimal> {
    let sum: Option<Decimal> = sqlx::query_scalar(
        r#"
        SELECT SUM(od.price)
        FROM order_details od
        JOIN orders o ON o.id = od.order_id
        LEFT JOIN books b ON b.id = od.book_id
        WHERE o.status <> $1
          AND o.created_at >= $2
          AND o.created_at < $3
          AND ($4::TEXT IS NULL OR b.category = $4)
        "#,
    )
    .bind(CANCELLED_ORDER_STATUS)
    .bind(start)
    .bind(end)
    .bind(category)
    .fetch_one(db)
    .await?;

    Ok(sum.unwrap_or(Decimal::ZERO))
}

/// In-store income for one bucket, `[start, end)`.
///
/// With a category, a sale counts in full when any of its lines is a book in
/// that category.
async fn bucket_sale_income(
    db: &PgPool,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    category: Option<&str>,
) -> AppResult<Decimal> {
    let sum: Option<Decimal> = sqlx::query_scalar(
        r#"
        SELECT SUM(s.total)
        FROM sales s
        WHERE s.created_at >= $1
          AND s.created_at < $2
          AND (
            $3::TEXT IS NULL
            OR EXISTS (
              SELECT 1
              FROM sale_details sd
              JOIN books b ON b.id = sd.book_id
              WHERE sd.sale_id = s.id AND b.category = $3
            )
          )
        "#,
    )
    .bind(start)
    .bind(end)
    .bind(category)
    .fetch_one(db)
    .await?;

    Ok(sum.unwrap_or(Decimal::ZERO))
}

fn to_product_sales(rows: Vec<(Uuid, Option<i64>, Option<Decimal>)>) -> Vec<ProductSales> {
    rows.into_iter()
        .map(|(book_id, quantity, revenue)| {
            ProductSales::new(
                book_id,
                quantity.unwrap_or(0),
                revenue.unwrap_or(Decimal::ZERO),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_sums_default_to_zero() {
        let rows = vec![(Uuid::from_u128(1), None, None)];
        let sales = to_product_sales(rows);
        assert_eq!(sales[0].quantity, 0);
        assert_eq!(sales[0].revenue, Decimal::ZERO);
    }

    #[test]
    fn test_export_series_csv() {
        let series = vec![
            IncomeBucket::new("ม.ค.", 2024, Decimal::from(100), Decimal::from(50)),
            IncomeBucket::new("ก.พ.", 2024, Decimal::ZERO, Decimal::ZERO),
        ];
        let csv = DashboardService::export_series_csv(&series).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("month,onlineIncome,saleIncome,income,year"));
        assert!(lines.next().unwrap().starts_with("ม.ค.,100"));
        assert!(lines.next().unwrap().ends_with(",2024"));
        assert_eq!(lines.next(), None);
    }
}
