//! Dashboard metrics engine.
//!
//! Five independent aggregation passes over order and user documents, plus
//! the assembler that fans them out concurrently and tolerates per-pass
//! failure. Every pass is a pure function of a snapshot and a reference
//! instant; nothing is cached between invocations.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use serde::Serialize;

use crate::models::order::{OrderRecord, OrderStatus};
use crate::models::user::UserRecord;
use crate::store::{RecordSource, SourceError};

/// Trailing calendar months in the revenue trend window, current month
/// included.
pub const TREND_WINDOW_MONTHS: usize = 6;

/// Recent orders shown on the dashboard.
pub const RECENT_ORDERS_LIMIT: usize = 5;

/// Default product ranking depth.
pub const TOP_PRODUCTS_LIMIT: usize = 5;

/// Order totals and the recent-order feed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OrderSummary {
    pub total_orders: u64,
    pub total_revenue: f64,
    pub average_order_value: f64,
    pub recent_orders: Vec<RecentOrder>,
}

/// Display projection of one recent order.
#[derive(Debug, Clone, Serialize)]
pub struct RecentOrder {
    pub id: String,
    pub customer: Option<String>,
    pub total: f64,
    pub status: OrderStatus,
    pub order_date: Option<DateTime<Utc>>,
}

/// Revenue and order count for one calendar month of the trend window.
/// `month_index` is 0-based (January = 0).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthBucket {
    pub year: i32,
    pub month_index: u32,
    pub label: String,
    pub revenue: f64,
    pub order_count: u64,
}

/// Units and revenue accumulated for one distinct product name. Names are
/// exact-string keys; casing and whitespace variants count separately.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductAggregate {
    pub name: String,
    pub units_sold: u64,
    pub revenue: f64,
}

/// Product ranking pass output, sorted descending by units sold. All
/// truncation goes through [`ProductRanking::top_k`] so every call site
/// sees the same slice of the same ordering.
#[derive(Debug, Clone, Default)]
pub struct ProductRanking {
    entries: Vec<ProductAggregate>,
}

impl ProductRanking {
    /// The canonical top-K slice.
    pub fn top_k(&self, k: usize) -> &[ProductAggregate] {
        &self.entries[..self.entries.len().min(k)]
    }

    pub fn entries(&self) -> &[ProductAggregate] {
        &self.entries
    }
}

/// Exact order tally for one lifecycle status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusAggregate {
    pub status: OrderStatus,
    pub count: u64,
}

/// User totals and current-month growth.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserGrowth {
    pub total_users: u64,
    pub new_users_this_month: u64,
}

/// Per-pass settlement state reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PassStatus {
    Ok,
    Degraded,
    TimedOut,
}

#[derive(Debug, Clone, Serialize)]
pub struct PassStatuses {
    pub order_summary: PassStatus,
    pub monthly_trend: PassStatus,
    pub product_ranking: PassStatus,
    pub status_distribution: PassStatus,
    pub user_growth: PassStatus,
}

/// The assembled dashboard view model. Always complete: a failed pass
/// contributes its zero value and a warning rather than an error.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardMetrics {
    pub order_summary: OrderSummary,
    pub monthly_trend: Vec<MonthBucket>,
    pub top_products: Vec<ProductAggregate>,
    pub status_distribution: Vec<StatusAggregate>,
    pub user_growth: UserGrowth,
    pub passes: PassStatuses,
    pub warnings: Vec<String>,
}

// -- Order summary pass --

/// Most recent `limit` orders by valid `orderDate`, newest first. Orders
/// without a parsable date sort last; ties keep fetch order.
pub fn select_recent(orders: &[OrderRecord], limit: usize) -> Vec<RecentOrder> {
    let mut sorted: Vec<&OrderRecord> = orders.iter().collect();
    sorted.sort_by(|a, b| match (a.order_date(), b.order_date()) {
        (Some(da), Some(db)) => db.cmp(&da),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    sorted
        .into_iter()
        .take(limit)
        .map(|order| RecentOrder {
            id: order.id.clone(),
            customer: order.customer().map(str::to_string),
            total: order.total(),
            status: order.status(),
            order_date: order.order_date(),
        })
        .collect()
}

/// Totals over the full order set plus the recent feed, both derived from
/// the same snapshot. Drawing the feed from the full set (rather than a
/// bounded store read) keeps orders with unusable dates from ever
/// occupying one of the recent slots.
pub fn summarize_orders(orders: &[OrderRecord]) -> OrderSummary {
    let total_orders = orders.len() as u64;
    let total_revenue: f64 = orders.iter().map(OrderRecord::total).sum();
    let average_order_value = if total_orders > 0 {
        total_revenue / total_orders as f64
    } else {
        0.0
    };
    OrderSummary {
        total_orders,
        total_revenue,
        average_order_value,
        recent_orders: select_recent(orders, RECENT_ORDERS_LIMIT),
    }
}

// -- Monthly trend pass --

fn month_key(date: &DateTime<Utc>) -> (i32, u32) {
    (date.year(), date.month0())
}

fn month_label(year: i32, month_index: u32) -> String {
    NaiveDate::from_ymd_opt(year, month_index + 1, 1)
        .map(|d| d.format("%b").to_string())
        .unwrap_or_default()
}

/// Revenue and order count bucketed into the trailing `window` calendar
/// months, oldest first. Buckets are pre-seeded so empty months stay
/// present at zero. Window membership is a `(year, month)` pair lookup,
/// never instant subtraction, so day-of-month overflow cannot shift an
/// order across a boundary.
pub fn monthly_trend(
    orders: &[OrderRecord],
    now: DateTime<Utc>,
    window: usize,
) -> Vec<MonthBucket> {
    let mut buckets: Vec<MonthBucket> = Vec::with_capacity(window);
    let mut index: HashMap<(i32, u32), usize> = HashMap::with_capacity(window);

    let current = now.year() * 12 + now.month0() as i32;
    for offset in (0..window as i32).rev() {
        let months = current - offset;
        let (year, month_index) = (months.div_euclid(12), months.rem_euclid(12) as u32);
        index.insert((year, month_index), buckets.len());
        buckets.push(MonthBucket {
            year,
            month_index,
            label: month_label(year, month_index),
            revenue: 0.0,
            order_count: 0,
        });
    }

    for order in orders {
        // Unparsable dates contribute to overall totals elsewhere but to
        // no bucket here.
        let Some(date) = order.order_date() else {
            continue;
        };
        if let Some(&i) = index.get(&month_key(&date)) {
            buckets[i].revenue += order.total();
            buckets[i].order_count += 1;
        }
    }

    buckets.sort_by_key(|b| (b.year, b.month_index));
    buckets
}

// -- Product ranking pass --

/// Per-product units and revenue across all orders' line items, ranked
/// descending by units sold. The stable sort keeps first-seen order for
/// equal unit counts.
pub fn rank_products(orders: &[OrderRecord]) -> ProductRanking {
    let mut entries: Vec<ProductAggregate> = Vec::new();
    let mut by_name: HashMap<String, usize> = HashMap::new();

    for order in orders {
        for item in order.items() {
            let i = match by_name.get(&item.name) {
                Some(&i) => i,
                None => {
                    by_name.insert(item.name.clone(), entries.len());
                    entries.push(ProductAggregate {
                        name: item.name.clone(),
                        units_sold: 0,
                        revenue: 0.0,
                    });
                    entries.len() - 1
                }
            };
            entries[i].units_sold += item.quantity;
            entries[i].revenue += item.price * item.quantity as f64;
        }
    }

    entries.sort_by(|a, b| b.units_sold.cmp(&a.units_sold));
    ProductRanking { entries }
}

// -- Status distribution pass --

/// Exact tally per observed status, in first-seen order. Every order lands
/// in exactly one entry, so the counts always sum to the order total.
pub fn status_distribution(orders: &[OrderRecord]) -> Vec<StatusAggregate> {
    let mut entries: Vec<StatusAggregate> = Vec::new();
    let mut by_status: HashMap<OrderStatus, usize> = HashMap::new();

    for order in orders {
        let status = order.status();
        let i = *by_status.entry(status).or_insert_with(|| {
            entries.push(StatusAggregate { status, count: 0 });
            entries.len() - 1
        });
        entries[i].count += 1;
    }
    entries
}

// -- User growth pass --

/// Total users plus those created on or after the first day of the current
/// calendar month of `now`. Unresolvable `createdAt` values are excluded
/// from the new-user count only.
pub fn user_growth(users: &[UserRecord], now: DateTime<Utc>) -> UserGrowth {
    let month_start = NaiveDate::from_ymd_opt(now.year(), now.month(), 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| Utc.from_utc_datetime(&dt));

    let new_users_this_month = match month_start {
        Some(start) => users
            .iter()
            .filter_map(UserRecord::created_at)
            .filter(|created| *created >= start)
            .count() as u64,
        None => 0,
    };

    UserGrowth {
        total_users: users.len() as u64,
        new_users_this_month,
    }
}

// -- Assembler --

struct PassResult<T> {
    value: T,
    status: PassStatus,
    warning: Option<String>,
}

/// Settle one pass: its own deadline, its own error isolation. A failed or
/// elapsed pass yields `fallback` and a warning instead of propagating.
async fn run_pass<T, F>(name: &str, deadline: Duration, fallback: T, pass: F) -> PassResult<T>
where
    F: Future<Output = Result<T, SourceError>>,
{
    match tokio::time::timeout(deadline, pass).await {
        Ok(Ok(value)) => PassResult {
            value,
            status: PassStatus::Ok,
            warning: None,
        },
        Ok(Err(err)) => {
            tracing::warn!(pass = name, error = %err, "dashboard pass degraded");
            PassResult {
                value: fallback,
                status: PassStatus::Degraded,
                warning: Some(format!("{name}: {err}")),
            }
        }
        Err(_) => {
            tracing::warn!(pass = name, timeout_ms = deadline.as_millis() as u64, "dashboard pass timed out");
            PassResult {
                value: fallback,
                status: PassStatus::TimedOut,
                warning: Some(format!("{name}: timed out")),
            }
        }
    }
}

async fn order_summary_pass<S: RecordSource>(source: &S) -> Result<OrderSummary, SourceError> {
    let orders = source.fetch_all_orders().await?;
    Ok(summarize_orders(&orders))
}

/// Run all five passes against one source snapshot and merge the results.
///
/// Passes fan out concurrently; each issues its own store read, so latency
/// is bounded by the slowest pass rather than the sum. A pass that fails
/// or exceeds `deadline` degrades to its zero value without disturbing its
/// siblings, and the operation only settles once all five have settled.
/// Dropping the returned future is the cancellation signal: in-flight
/// reads and partial accumulations are discarded silently.
pub async fn compute_dashboard_metrics<S: RecordSource>(
    source: &S,
    now: DateTime<Utc>,
    deadline: Duration,
) -> DashboardMetrics {
    let (summary, trend, ranking, statuses, growth) = tokio::join!(
        run_pass(
            "order summary",
            deadline,
            OrderSummary::default(),
            order_summary_pass(source),
        ),
        run_pass(
            "monthly trend",
            deadline,
            // The degraded trend is still a full window of zeroed buckets.
            monthly_trend(&[], now, TREND_WINDOW_MONTHS),
            async {
                let orders = source.fetch_all_orders().await?;
                Ok(monthly_trend(&orders, now, TREND_WINDOW_MONTHS))
            },
        ),
        run_pass(
            "product ranking",
            deadline,
            ProductRanking::default(),
            async { Ok(rank_products(&source.fetch_all_orders().await?)) },
        ),
        run_pass("status distribution", deadline, Vec::new(), async {
            Ok(status_distribution(&source.fetch_all_orders().await?))
        }),
        run_pass("user growth", deadline, UserGrowth::default(), async {
            Ok(user_growth(&source.fetch_all_users().await?, now))
        }),
    );

    let warnings = [
        summary.warning,
        trend.warning,
        ranking.warning,
        statuses.warning,
        growth.warning,
    ]
    .into_iter()
    .flatten()
    .collect();

    DashboardMetrics {
        order_summary: summary.value,
        monthly_trend: trend.value,
        top_products: ranking.value.top_k(TOP_PRODUCTS_LIMIT).to_vec(),
        status_distribution: statuses.value,
        user_growth: growth.value,
        passes: PassStatuses {
            order_summary: summary.status,
            monthly_trend: trend.status,
            product_ranking: ranking.status,
            status_distribution: statuses.status,
            user_growth: growth.status,
        },
        warnings,
    }
}
