pub mod config;
pub mod errors;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

use sqlx::PgPool;

/// Shared application state passed to all Axum handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: config::AppConfig,
}
