//! Dashboard routes: aggregated metrics for the operator overview page.

use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;

use crate::errors::{ApiResponse, AppError};
use crate::models::paging::LimitQuery;
use crate::services::dashboard::{self, DashboardMetrics, ProductAggregate, RecentOrder};
use crate::store::{PgDocumentStore, RecordSource};
use crate::AppState;

/// GET /api/v1/dashboard/metrics — the full dashboard view model.
///
/// Always responds 200 once the assembler settles; degraded passes are
/// reported inline through the per-pass flags and warning list.
pub async fn metrics(State(state): State<AppState>) -> Json<ApiResponse<DashboardMetrics>> {
    let source = PgDocumentStore::new(state.db.clone());
    let metrics = dashboard::compute_dashboard_metrics(
        &source,
        Utc::now(),
        state.config.dashboard_deadline(),
    )
    .await;
    ApiResponse::success(metrics)
}

/// GET /api/v1/dashboard/recent-orders — recent order feed, for display
/// paging beyond the dashboard's default five.
pub async fn recent_orders(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<ApiResponse<Vec<RecentOrder>>>, AppError> {
    let source = PgDocumentStore::new(state.db.clone());
    let limit = query.limit();
    let fetched = source.fetch_recent_orders(limit).await?;
    Ok(ApiResponse::success(dashboard::select_recent(
        &fetched, limit,
    )))
}

/// GET /api/v1/dashboard/top-products — product ranking, for display
/// paging beyond the dashboard's default five.
pub async fn top_products(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<ApiResponse<Vec<ProductAggregate>>>, AppError> {
    let source = PgDocumentStore::new(state.db.clone());
    let orders = source.fetch_all_orders().await?;
    let ranking = dashboard::rank_products(&orders);
    Ok(ApiResponse::success(ranking.top_k(query.limit()).to_vec()))
}
