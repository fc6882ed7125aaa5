//! Seed script for development — populates the document store with sample
//! catalog orders and users.
//!
//! Usage: `cargo run --bin seed`
//!
//! Requires `DATABASE_URL` (reads .env). Existing `orders` and `users`
//! collections are replaced.

use chrono::{Months, Utc};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let db_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await?;

    println!("=== shopadmin seed script ===");

    create_schema(&pool).await?;
    clear_collections(&pool).await?;
    seed_orders(&pool).await?;
    seed_users(&pool).await?;

    println!("\n=== Seed complete! ===");

    Ok(())
}

async fn create_schema(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS documents (
            collection TEXT NOT NULL,
            id TEXT NOT NULL,
            data JSONB NOT NULL,
            PRIMARY KEY (collection, id)
        )",
    )
    .execute(pool)
    .await?;
    println!("[done] Schema ready");
    Ok(())
}

async fn clear_collections(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::query("DELETE FROM documents WHERE collection IN ('orders', 'users')")
        .execute(pool)
        .await?;
    println!("[done] Cleared orders and users collections");
    Ok(())
}

async fn insert(pool: &PgPool, collection: &str, data: serde_json::Value) -> anyhow::Result<()> {
    sqlx::query("INSERT INTO documents (collection, id, data) VALUES ($1, $2, $3)")
        .bind(collection)
        .bind(Uuid::new_v4().to_string())
        .bind(data)
        .execute(pool)
        .await?;
    Ok(())
}

async fn seed_orders(pool: &PgPool) -> anyhow::Result<()> {
    let now = Utc::now();
    let statuses = ["Placed", "Approved", "Shipped", "Delivered", "Cancelled"];
    let catalog: [(&str, f64); 4] = [
        ("Fountain Pen", 50.0),
        ("Leather Notebook", 120.0),
        ("Ink Bottle", 25.0),
        ("Desk Organizer", 200.0),
    ];

    let mut count = 0;
    // A few orders in each of the last five months, rotating status and
    // items so every dashboard widget has something to show.
    for months_ago in 0..5u32 {
        let date = now
            .checked_sub_months(Months::new(months_ago))
            .unwrap_or(now);
        for n in 0..(5 - months_ago) {
            let (name, price) = catalog[(n as usize + months_ago as usize) % catalog.len()];
            let quantity = 1 + (n as u64 % 3);
            insert(
                pool,
                "orders",
                json!({
                    "orderDate": date.to_rfc3339(),
                    "total": price * quantity as f64,
                    "status": statuses[(n as usize + months_ago as usize) % statuses.len()],
                    "userName": format!("Customer {}", n + 1),
                    "userEmail": format!("customer{}@example.com", n + 1),
                    "items": [{"name": name, "quantity": quantity, "price": price}]
                }),
            )
            .await?;
            count += 1;
        }
    }

    // One deliberately messy order: the dashboard must absorb it.
    insert(
        pool,
        "orders",
        json!({"orderDate": "pending", "total": "n/a", "items": "none"}),
    )
    .await?;
    count += 1;

    println!("[done] Seeded {count} orders");
    Ok(())
}

async fn seed_users(pool: &PgPool) -> anyhow::Result<()> {
    let now = Utc::now();
    let mut count = 0;

    for months_ago in 0..6u32 {
        let date = now
            .checked_sub_months(Months::new(months_ago))
            .unwrap_or(now);
        for n in 0..2 {
            insert(
                pool,
                "users",
                json!({
                    "email": format!("user{months_ago}{n}@example.com"),
                    "createdAt": date.to_rfc3339()
                }),
            )
            .await?;
            count += 1;
        }
    }

    // A legacy account without a creation time.
    insert(pool, "users", json!({"email": "legacy@example.com"})).await?;
    count += 1;

    println!("[done] Seeded {count} users");
    Ok(())
}
