//! SQLite-backed `OrderStore`.
//!
//! Durable only for the RAW bin: on restart, BATCHING/READY membership
//! is reconstructed by re-running the batching tick rather than
//! replayed from storage.

use sqlx::{Row, SqlitePool};

use dispatch_core::coordinate::Coordinate;
use dispatch_core::order::{Order, OrderId, OrderStatus};

use super::OrderStore;
use crate::error::QueueError;

pub struct SqliteOrderStore {
    pool: SqlitePool,
}

impl SqliteOrderStore {
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn new(path: &str) -> anyhow::Result<Self> {
        let pool = SqlitePool::connect(path).await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS orders (
                id TEXT PRIMARY KEY,
                pickup_lat REAL NOT NULL,
                pickup_lon REAL NOT NULL,
                dropoff_lat REAL NOT NULL,
                dropoff_lon REAL NOT NULL,
                merchant_id TEXT,
                created_at_secs INTEGER NOT NULL,
                ready_at_secs INTEGER,
                status TEXT NOT NULL
            );
        "#,
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }
}

#[async_trait::async_trait]
impl OrderStore for SqliteOrderStore {
    async fn load_all(&self) -> Result<Vec<Order>, QueueError> {
        let rows = sqlx::query("SELECT * FROM orders")
            .fetch_all(&self.pool)
            .await?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let id_str: String = row.get("id");
            let id: OrderId = uuid::Uuid::parse_str(&id_str)?;
            let status_str: String = row.get("status");
            let status: OrderStatus = status_str
                .parse()
                .map_err(|_| QueueError::InvalidStatus(status_str.clone()))?;

            orders.push(Order {
                id,
                pickup: Coordinate::new(row.get("pickup_lat"), row.get("pickup_lon")),
                dropoff: Coordinate::new(row.get("dropoff_lat"), row.get("dropoff_lon")),
                merchant_id: row.get("merchant_id"),
                created_at_secs: row.get::<i64, _>("created_at_secs") as u64,
                ready_at_secs: row.get::<Option<i64>, _>("ready_at_secs").map(|v| v as u64),
                status,
            });
        }
        Ok(orders)
    }

    async fn save(&self, order: &Order) -> Result<(), QueueError> {
        sqlx::query(
            r#"
            INSERT INTO orders (
                id, pickup_lat, pickup_lon, dropoff_lat, dropoff_lon,
                merchant_id, created_at_secs, ready_at_secs, status
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                pickup_lat = excluded.pickup_lat,
                pickup_lon = excluded.pickup_lon,
                dropoff_lat = excluded.dropoff_lat,
                dropoff_lon = excluded.dropoff_lon,
                merchant_id = excluded.merchant_id,
                created_at_secs = excluded.created_at_secs,
                ready_at_secs = excluded.ready_at_secs,
                status = excluded.status;
        "#,
        )
        .bind(order.id.to_string())
        .bind(order.pickup.lat)
        .bind(order.pickup.lon)
        .bind(order.dropoff.lat)
        .bind(order.dropoff.lon)
        .bind(&order.merchant_id)
        .bind(order.created_at_secs as i64)
        .bind(order.ready_at_secs.map(|v| v as i64))
        .bind(order.status.to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, order_id: OrderId) -> Result<(), QueueError> {
        sqlx::query("DELETE FROM orders WHERE id = ?")
            .bind(order_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
