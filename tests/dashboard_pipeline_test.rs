//! Integration tests for the dashboard assembler: fan-out, per-pass error
//! isolation, and timeout degradation, exercised against an in-memory
//! record source.

use std::time::Duration;

use chrono::{TimeZone, Utc};
use serde_json::json;
use shopadmin::models::order::OrderRecord;
use shopadmin::models::user::UserRecord;
use shopadmin::services::dashboard::{self, PassStatus};
use shopadmin::store::{RecordSource, SourceError};

const DEADLINE: Duration = Duration::from_secs(5);

/// In-memory record source with per-collection failure and stall switches.
#[derive(Clone, Default)]
struct MemorySource {
    orders: Vec<OrderRecord>,
    users: Vec<UserRecord>,
    fail_orders: bool,
    fail_users: bool,
    stall_users: bool,
}

impl RecordSource for MemorySource {
    async fn fetch_all_orders(&self) -> Result<Vec<OrderRecord>, SourceError> {
        if self.fail_orders {
            return Err(SourceError::Unavailable("orders collection offline".into()));
        }
        Ok(self.orders.clone())
    }

    async fn fetch_recent_orders(&self, limit: usize) -> Result<Vec<OrderRecord>, SourceError> {
        if self.fail_orders {
            return Err(SourceError::Unavailable("orders collection offline".into()));
        }
        Ok(self.orders.iter().take(limit).cloned().collect())
    }

    async fn fetch_all_users(&self) -> Result<Vec<UserRecord>, SourceError> {
        if self.stall_users {
            tokio::time::sleep(Duration::from_secs(60)).await;
        }
        if self.fail_users {
            return Err(SourceError::Unavailable("users collection offline".into()));
        }
        Ok(self.users.clone())
    }
}

fn populated_source() -> MemorySource {
    MemorySource {
        orders: vec![
            OrderRecord::new(
                "o1",
                json!({
                    "orderDate": "2026-08-10T12:00:00Z",
                    "total": 500,
                    "status": "Placed",
                    "userName": "Ada",
                    "items": [{"name": "Pen", "quantity": 3, "price": 50}]
                }),
            ),
            OrderRecord::new(
                "o2",
                json!({
                    "orderDate": "2026-07-02T08:00:00Z",
                    "total": 120,
                    "status": "Delivered",
                    "items": [{"name": "Pad", "quantity": 1, "price": 120}]
                }),
            ),
            OrderRecord::new("o3", json!({"orderDate": "???", "total": 30})),
        ],
        users: vec![
            UserRecord::new("u1", json!({"createdAt": "2026-08-03T00:00:00Z"})),
            UserRecord::new("u2", json!({"createdAt": "2026-01-01T00:00:00Z"})),
            UserRecord::new("u3", json!({})),
        ],
        ..Default::default()
    }
}

fn mid_august() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 15, 12, 0, 0).unwrap()
}

#[tokio::test]
async fn full_dashboard_over_healthy_source() {
    let source = populated_source();
    let metrics = dashboard::compute_dashboard_metrics(&source, mid_august(), DEADLINE).await;

    assert_eq!(metrics.passes.order_summary, PassStatus::Ok);
    assert_eq!(metrics.passes.monthly_trend, PassStatus::Ok);
    assert_eq!(metrics.passes.product_ranking, PassStatus::Ok);
    assert_eq!(metrics.passes.status_distribution, PassStatus::Ok);
    assert_eq!(metrics.passes.user_growth, PassStatus::Ok);
    assert!(metrics.warnings.is_empty());

    assert_eq!(metrics.order_summary.total_orders, 3);
    assert_eq!(metrics.order_summary.total_revenue, 650.0);
    assert_eq!(metrics.order_summary.recent_orders[0].id, "o1");

    assert_eq!(metrics.monthly_trend.len(), 6);
    let august = metrics.monthly_trend.last().unwrap();
    assert_eq!(august.order_count, 1);
    assert_eq!(august.revenue, 500.0);
    // The undated order reaches no bucket.
    let bucketed: u64 = metrics.monthly_trend.iter().map(|b| b.order_count).sum();
    assert_eq!(bucketed, 2);

    assert_eq!(metrics.top_products.len(), 2);
    assert_eq!(metrics.top_products[0].name, "Pen");

    let status_total: u64 = metrics.status_distribution.iter().map(|s| s.count).sum();
    assert_eq!(status_total, 3);

    assert_eq!(metrics.user_growth.total_users, 3);
    assert_eq!(metrics.user_growth.new_users_this_month, 1);
}

#[tokio::test]
async fn recent_feed_excludes_garbage_dates_when_over_limit() {
    // Garbage date text sorts above RFC 3339 strings in a naive textual
    // ordering; the feed must still be the five most recent valid-dated
    // orders.
    let mut source = MemorySource::default();
    source.orders.push(OrderRecord::new(
        "garbage",
        json!({"orderDate": "pending", "total": 5}),
    ));
    for d in 1..=6u32 {
        source.orders.push(OrderRecord::new(
            format!("d{d}"),
            json!({"orderDate": format!("2026-08-{:02}T00:00:00Z", 11 - d), "total": 10}),
        ));
    }

    let metrics = dashboard::compute_dashboard_metrics(&source, mid_august(), DEADLINE).await;

    let ids: Vec<&str> = metrics
        .order_summary
        .recent_orders
        .iter()
        .map(|r| r.id.as_str())
        .collect();
    assert_eq!(ids, ["d1", "d2", "d3", "d4", "d5"]);
    assert_eq!(metrics.order_summary.total_orders, 7);
    assert_eq!(metrics.order_summary.total_revenue, 65.0);
}

#[tokio::test]
async fn empty_source_yields_zeroed_dashboard() {
    let source = MemorySource::default();
    let metrics = dashboard::compute_dashboard_metrics(&source, mid_august(), DEADLINE).await;

    assert_eq!(metrics.order_summary.total_orders, 0);
    assert_eq!(metrics.order_summary.total_revenue, 0.0);
    assert_eq!(metrics.order_summary.average_order_value, 0.0);
    assert!(metrics.order_summary.recent_orders.is_empty());
    assert_eq!(metrics.monthly_trend.len(), 6);
    assert!(metrics
        .monthly_trend
        .iter()
        .all(|b| b.revenue == 0.0 && b.order_count == 0));
    assert!(metrics.top_products.is_empty());
    assert!(metrics.status_distribution.is_empty());
    assert_eq!(metrics.user_growth.total_users, 0);
    assert!(metrics.warnings.is_empty());
}

#[tokio::test]
async fn order_source_failure_degrades_only_order_passes() {
    let source = MemorySource {
        fail_orders: true,
        ..populated_source()
    };
    let metrics = dashboard::compute_dashboard_metrics(&source, mid_august(), DEADLINE).await;

    assert_eq!(metrics.passes.order_summary, PassStatus::Degraded);
    assert_eq!(metrics.passes.monthly_trend, PassStatus::Degraded);
    assert_eq!(metrics.passes.product_ranking, PassStatus::Degraded);
    assert_eq!(metrics.passes.status_distribution, PassStatus::Degraded);
    assert_eq!(metrics.passes.user_growth, PassStatus::Ok);
    assert_eq!(metrics.warnings.len(), 4);

    // Degraded passes fall back to their zero shapes; the trend window is
    // still fully seeded.
    assert_eq!(metrics.order_summary.total_orders, 0);
    assert_eq!(metrics.monthly_trend.len(), 6);
    assert!(metrics.top_products.is_empty());
    assert!(metrics.status_distribution.is_empty());

    // The sibling pass still delivered real data.
    assert_eq!(metrics.user_growth.total_users, 3);
}

#[tokio::test]
async fn user_source_failure_degrades_only_user_growth() {
    let source = MemorySource {
        fail_users: true,
        ..populated_source()
    };
    let metrics = dashboard::compute_dashboard_metrics(&source, mid_august(), DEADLINE).await;

    assert_eq!(metrics.passes.user_growth, PassStatus::Degraded);
    assert_eq!(metrics.passes.order_summary, PassStatus::Ok);
    assert_eq!(metrics.user_growth.total_users, 0);
    assert_eq!(metrics.order_summary.total_orders, 3);
    assert_eq!(metrics.warnings.len(), 1);
    assert!(metrics.warnings[0].contains("user growth"));
}

#[tokio::test]
async fn stalled_pass_times_out_without_blocking_siblings() {
    let source = MemorySource {
        stall_users: true,
        ..populated_source()
    };
    let metrics =
        dashboard::compute_dashboard_metrics(&source, mid_august(), Duration::from_millis(50))
            .await;

    assert_eq!(metrics.passes.user_growth, PassStatus::TimedOut);
    assert_eq!(metrics.passes.order_summary, PassStatus::Ok);
    assert_eq!(metrics.passes.monthly_trend, PassStatus::Ok);
    assert_eq!(metrics.user_growth.total_users, 0);
    assert_eq!(metrics.order_summary.total_orders, 3);
    assert!(metrics.warnings.iter().any(|w| w.contains("timed out")));
}
