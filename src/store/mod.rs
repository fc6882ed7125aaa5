//! Document store access: connection pool and the record source contract.

use std::future::Future;

use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::models::order::OrderRecord;
use crate::models::user::UserRecord;

/// Page size for full-collection reads.
const FETCH_PAGE_SIZE: i64 = 500;

/// Record source failure: the store could not be reached or returned
/// malformed top-level data. Single-field anomalies are never surfaced
/// here; they are absorbed during coercion.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("record source unavailable: {0}")]
    Unavailable(String),

    #[error("record source query failed: {0}")]
    Database(#[from] sqlx::Error),
}

/// Read contract for the remote document store. Each call returns a
/// finite snapshot; the store is otherwise a black box.
pub trait RecordSource: Send + Sync {
    fn fetch_all_orders(
        &self,
    ) -> impl Future<Output = Result<Vec<OrderRecord>, SourceError>> + Send;

    /// At most `limit` orders, newest `orderDate` first.
    fn fetch_recent_orders(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<OrderRecord>, SourceError>> + Send;

    fn fetch_all_users(
        &self,
    ) -> impl Future<Output = Result<Vec<UserRecord>, SourceError>> + Send;
}

/// Create a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Record source backed by a Postgres `documents` table holding one JSONB
/// document per row, Firestore-style.
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Read an entire collection in fixed-size pages.
    async fn fetch_collection(&self, collection: &str) -> Result<Vec<(String, Value)>, SourceError> {
        let mut docs = Vec::new();
        let mut offset = 0i64;
        loop {
            let page: Vec<(String, Value)> = sqlx::query_as(
                "SELECT id, data FROM documents
                 WHERE collection = $1
                 ORDER BY id
                 LIMIT $2 OFFSET $3",
            )
            .bind(collection)
            .bind(FETCH_PAGE_SIZE)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

            let fetched = page.len() as i64;
            docs.extend(page);
            if fetched < FETCH_PAGE_SIZE {
                break;
            }
            offset += FETCH_PAGE_SIZE;
        }
        Ok(docs)
    }
}

impl RecordSource for PgDocumentStore {
    async fn fetch_all_orders(&self) -> Result<Vec<OrderRecord>, SourceError> {
        Ok(self
            .fetch_collection("orders")
            .await?
            .into_iter()
            .map(|(id, data)| OrderRecord::new(id, data))
            .collect())
    }

    async fn fetch_recent_orders(&self, limit: usize) -> Result<Vec<OrderRecord>, SourceError> {
        // Only ISO-shaped date strings participate in the ordering; any
        // other text would sort above every real date and steal a slot,
        // so it is pushed to the back with the NULLs instead.
        let rows: Vec<(String, Value)> = sqlx::query_as(
            r"SELECT id, data FROM documents
             WHERE collection = 'orders'
             ORDER BY (CASE WHEN data->>'orderDate' ~ '^\d{4}-\d{2}-\d{2}'
                            THEN data->>'orderDate' END) DESC NULLS LAST
             LIMIT $1",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, data)| OrderRecord::new(id, data))
            .collect())
    }

    async fn fetch_all_users(&self) -> Result<Vec<UserRecord>, SourceError> {
        Ok(self
            .fetch_collection("users")
            .await?
            .into_iter()
            .map(|(id, data)| UserRecord::new(id, data))
            .collect())
    }
}
