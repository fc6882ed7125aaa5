//! Route definitions for the shopadmin API.

pub mod dashboard;
pub mod health;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::AppState;

/// Assemble the application router with tracing and CORS layers.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health/live", get(health::live))
        .route("/health/ready", get(health::ready))
        .route("/api/v1/dashboard/metrics", get(dashboard::metrics))
        .route(
            "/api/v1/dashboard/recent-orders",
            get(dashboard::recent_orders),
        )
        .route(
            "/api/v1/dashboard/top-products",
            get(dashboard::top_products),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
