//! Dashboard query tests against PostgreSQL
//!
//! Each test gets a fresh database with the migrations applied (requires
//! `DATABASE_URL`). Covers:
//! - Cancelled orders excluded from income
//! - Category filter through order and sale lines
//! - Inclusive date range bounds
//! - Missing catalog entries in the top products list

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::str::FromStr;
use uuid::Uuid;

use bookstore_dashboard::config::DashboardConfig;
use bookstore_dashboard::services::DashboardService;
use shared::DashboardFilter;

const FICTION_BOOK: Uuid = Uuid::from_u128(1);
const SCIENCE_BOOK: Uuid = Uuid::from_u128(2);
const DELETED_BOOK: Uuid = Uuid::from_u128(9);

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0).unwrap()
}

fn service(pool: PgPool) -> DashboardService {
    DashboardService::new(
        pool,
        &DashboardConfig {
            max_concurrent_buckets: 4,
            top_products_limit: 5,
        },
    )
}

// ============================================================================
// Fixtures
// ============================================================================

async fn insert_book(pool: &PgPool, id: Uuid, name: &str, category: &str, price: &str) {
    sqlx::query("INSERT INTO books (id, name, image, category, price) VALUES ($1, $2, $3, $4, $5)")
        .bind(id)
        .bind(name)
        .bind(format!("{}.jpg", name))
        .bind(category)
        .bind(dec(price))
        .execute(pool)
        .await
        .unwrap();
}

async fn insert_order(pool: &PgPool, status: &str, created_at: DateTime<Utc>, lines: &[(Uuid, i32, &str)]) {
    let order_id: Uuid =
        sqlx::query_scalar("INSERT INTO orders (status, created_at) VALUES ($1, $2) RETURNING id")
            .bind(status)
            .bind(created_at)
            .fetch_one(pool)
            .await
            .unwrap();

    for (book_id, qty, price) in lines {
        sqlx::query("INSERT INTO order_details (order_id, book_id, price, qty) VALUES ($1, $2, $3, $4)")
            .bind(order_id)
            .bind(book_id)
            .bind(dec(price))
            .bind(qty)
            .execute(pool)
            .await
            .unwrap();
    }
}

async fn insert_sale(pool: &PgPool, total: &str, created_at: DateTime<Utc>, lines: &[(Uuid, i32, &str)]) {
    let sale_id: Uuid =
        sqlx::query_scalar("INSERT INTO sales (total, created_at) VALUES ($1, $2) RETURNING id")
            .bind(dec(total))
            .bind(created_at)
            .fetch_one(pool)
            .await
            .unwrap();

    for (book_id, qty, price) in lines {
        sqlx::query("INSERT INTO sale_details (sale_id, book_id, price, qty) VALUES ($1, $2, $3, $4)")
            .bind(sale_id)
            .bind(book_id)
            .bind(dec(price))
            .bind(qty)
            .execute(pool)
            .await
            .unwrap();
    }
}

/// January 2024 store activity:
/// - Jan 10: completed order, fiction x2 (100) and science x1 (5)
/// - Jan 15: cancelled order, fiction x50 (1000)
/// - Jan 20: in-store sale of 300 mixing fiction and science
/// - Jan 31 12:00: completed order for a book no longer in the catalog, x3 (100)
async fn seed_store(pool: &PgPool) {
    insert_book(pool, FICTION_BOOK, "Dune", "fiction", "350").await;
    insert_book(pool, SCIENCE_BOOK, "Cosmos", "science", "200").await;
    sqlx::query("INSERT INTO members (name) VALUES ('สมชาย')")
        .execute(pool)
        .await
        .unwrap();

    insert_order(
        pool,
        "complete",
        at(2024, 1, 10, 10),
        &[(FICTION_BOOK, 2, "100"), (SCIENCE_BOOK, 1, "5")],
    )
    .await;
    insert_order(pool, "cancel", at(2024, 1, 15, 9), &[(FICTION_BOOK, 50, "1000")]).await;
    insert_sale(
        pool,
        "300",
        at(2024, 1, 20, 14),
        &[(FICTION_BOOK, 1, "150"), (SCIENCE_BOOK, 1, "150")],
    )
    .await;
    insert_order(pool, "complete", at(2024, 1, 31, 12), &[(DELETED_BOOK, 3, "100")]).await;
}

// ============================================================================
// Dashboard Summary
// ============================================================================

#[sqlx::test(migrations = "./migrations")]
async fn test_empty_store_is_all_zero(pool: PgPool) {
    let filter = DashboardFilter::from_query(None, Some("2024"), None, 2024);
    let summary = service(pool).get_dashboard(filter).await.unwrap();

    assert_eq!(summary.total_order, 0);
    assert_eq!(summary.total_member, 0);
    assert_eq!(summary.total_sale_count, 0);
    assert_eq!(summary.total_income, Decimal::ZERO);
    assert_eq!(summary.total_sale_income, Decimal::ZERO);
    assert_eq!(summary.total_all_income, Decimal::ZERO);
    assert_eq!(summary.monthly_income.len(), 12);
    assert!(summary.monthly_income.iter().all(|b| b.income == Decimal::ZERO));
    assert!(summary.top_products.is_empty());
    assert!(summary.categories.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_totals_exclude_cancelled_orders(pool: PgPool) {
    seed_store(&pool).await;

    let filter = DashboardFilter::from_query(None, Some("2024"), None, 2024);
    let summary = service(pool).get_dashboard(filter).await.unwrap();

    // Every order is counted, but only non-cancelled lines are income
    assert_eq!(summary.total_order, 3);
    assert_eq!(summary.total_member, 1);
    assert_eq!(summary.total_sale_count, 1);
    assert_eq!(summary.total_income, dec("205"));
    assert_eq!(summary.total_sale_income, dec("300"));
    assert_eq!(summary.total_all_income, dec("505"));
    assert_eq!(summary.categories, vec!["fiction".to_string(), "science".to_string()]);

    let january = &summary.monthly_income[0];
    assert_eq!(january.month, "ม.ค.");
    assert_eq!(january.online_income, dec("205"));
    assert_eq!(january.sale_income, dec("300"));
    assert_eq!(january.income, dec("505"));
    assert!(summary.monthly_income[1..].iter().all(|b| b.income == Decimal::ZERO));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_top_products_merge_channels_and_keep_missing_books(pool: PgPool) {
    seed_store(&pool).await;

    let filter = DashboardFilter::from_query(None, Some("2024"), None, 2024);
    let summary = service(pool).get_dashboard(filter).await.unwrap();
    let top = &summary.top_products;

    // Fiction and the deleted book tie at 3 sold; the lower id ranks first
    assert_eq!(top.len(), 3);
    assert_eq!(top[0].id, FICTION_BOOK);
    assert_eq!(top[0].name, "Dune");
    assert_eq!(top[0].total_sold, 3);
    assert_eq!(top[0].total_revenue, dec("250"));
    assert_eq!(top[0].category, "fiction");

    assert_eq!(top[1].id, DELETED_BOOK);
    assert_eq!(top[1].name, "");
    assert_eq!(top[1].image, None);
    assert_eq!(top[1].category, "");
    assert_eq!(top[1].price, Decimal::ZERO);
    assert_eq!(top[1].total_sold, 3);

    assert_eq!(top[2].id, SCIENCE_BOOK);
    assert_eq!(top[2].total_sold, 2);
    assert_eq!(top[2].total_revenue, dec("155"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_category_filter_restricts_series_and_products(pool: PgPool) {
    seed_store(&pool).await;

    let filter = DashboardFilter::from_query(Some("1"), Some("2024"), Some("fiction"), 2024);
    let summary = service(pool).get_dashboard(filter).await.unwrap();

    assert_eq!(summary.monthly_income.len(), 31);
    let nonzero: Vec<&str> = summary
        .monthly_income
        .iter()
        .filter(|b| b.income != Decimal::ZERO)
        .map(|b| b.month.as_str())
        .collect();
    assert_eq!(nonzero, vec!["10", "20"]);

    // Only the fiction line of the Jan 10 order counts
    assert_eq!(summary.monthly_income[9].online_income, dec("100"));
    // A sale with any fiction line counts in full
    assert_eq!(summary.monthly_income[19].sale_income, dec("300"));

    assert_eq!(summary.top_products.len(), 1);
    assert_eq!(summary.top_products[0].id, FICTION_BOOK);
    assert_eq!(summary.top_products[0].total_sold, 3);

    // Store-wide cards ignore the filter
    assert_eq!(summary.total_income, dec("205"));
    assert_eq!(summary.selected_filters.category.as_deref(), Some("fiction"));
    assert_eq!(summary.selected_filters.month, Some(1));
}

// ============================================================================
// Income by Date Range
// ============================================================================

#[sqlx::test(migrations = "./migrations")]
async fn test_income_range_bounds_are_midnight_inclusive(pool: PgPool) {
    seed_store(&pool).await;

    let income = service(pool)
        .get_income_by_date_range("2024-01-01".to_string(), "2024-01-31".to_string())
        .await
        .unwrap();

    // The Jan 31 12:00 order falls after the end bound of Jan 31 00:00
    assert_eq!(income.online_income, dec("105"));
    assert_eq!(income.sale_income, dec("300"));
    assert_eq!(income.total_income, dec("405"));
    assert_eq!(income.start_date, "2024-01-01");
    assert_eq!(income.end_date, "2024-01-31");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_income_range_includes_exact_end_timestamp(pool: PgPool) {
    seed_store(&pool).await;

    let income = service(pool)
        .get_income_by_date_range(
            "2024-01-20T14:00:00Z".to_string(),
            "2024-01-31T12:00:00Z".to_string(),
        )
        .await
        .unwrap();

    assert_eq!(income.online_income, dec("100"));
    assert_eq!(income.sale_income, dec("300"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_income_range_rejects_invalid_dates(pool: PgPool) {
    let result = service(pool)
        .get_income_by_date_range("junk".to_string(), "2024-01-31".to_string())
        .await;
    assert!(result.is_err());
}
