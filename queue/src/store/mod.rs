pub mod memory_store;
pub mod sqlite_store;

use dispatch_core::order::{Order, OrderId};

use crate::error::QueueError;

/// Durability seam for RAW-bin membership. Persistence *format* is
/// deliberately out of scope; this trait only commits to there being a
/// seam, with an in-memory and a SQLite-backed implementation below.
#[async_trait::async_trait]
pub trait OrderStore: Send + Sync {
    async fn load_all(&self) -> Result<Vec<Order>, QueueError>;
    async fn save(&self, order: &Order) -> Result<(), QueueError>;
    async fn delete(&self, order_id: OrderId) -> Result<(), QueueError>;
}
