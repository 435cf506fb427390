use std::collections::HashMap;

use tokio::sync::Mutex;

use dispatch_core::order::{Order, OrderId};

use super::OrderStore;
use crate::error::QueueError;

/// No-op-durability store for tests and single-process simulation runs.
#[derive(Default)]
pub struct InMemoryOrderStore {
    orders: Mutex<HashMap<OrderId, Order>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn load_all(&self) -> Result<Vec<Order>, QueueError> {
        Ok(self.orders.lock().await.values().cloned().collect())
    }

    async fn save(&self, order: &Order) -> Result<(), QueueError> {
        self.orders.lock().await.insert(order.id, order.clone());
        Ok(())
    }

    async fn delete(&self, order_id: OrderId) -> Result<(), QueueError> {
        self.orders.lock().await.remove(&order_id);
        Ok(())
    }
}
