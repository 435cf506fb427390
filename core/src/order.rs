use std::fmt;
use std::str::FromStr;

use crate::coordinate::Coordinate;

pub type OrderId = uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Raw,
    Batching,
    Ready,
    Assigned,
    Cancelled,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderStatus::Raw => "RAW",
            OrderStatus::Batching => "BATCHING",
            OrderStatus::Ready => "READY",
            OrderStatus::Assigned => "ASSIGNED",
            OrderStatus::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

impl FromStr for OrderStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RAW" => Ok(OrderStatus::Raw),
            "BATCHING" => Ok(OrderStatus::Batching),
            "READY" => Ok(OrderStatus::Ready),
            "ASSIGNED" => Ok(OrderStatus::Assigned),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            other => Err(anyhow::anyhow!("invalid OrderStatus value: {}", other)),
        }
    }
}

/// A customer delivery request.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: OrderId,
    pub pickup: Coordinate,
    pub dropoff: Coordinate,
    /// Merchant identity used for hard clustering; absent orders fall
    /// back to coordinate-bucket clustering.
    pub merchant_id: Option<String>,
    pub created_at_secs: u64,
    pub ready_at_secs: Option<u64>,
    pub status: OrderStatus,
}

impl Order {
    pub fn new_raw(
        id: OrderId,
        pickup: Coordinate,
        dropoff: Coordinate,
        merchant_id: Option<String>,
        created_at_secs: u64,
        ready_at_secs: Option<u64>,
    ) -> Self {
        Self {
            id,
            pickup,
            dropoff,
            merchant_id,
            created_at_secs,
            ready_at_secs,
            status: OrderStatus::Raw,
        }
    }

    pub fn age_seconds(&self, now_secs: u64) -> u64 {
        now_secs.saturating_sub(self.created_at_secs)
    }
}
