use crate::coordinate::Coordinate;
use crate::order::OrderId;

pub type JobId = uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopType {
    Pickup,
    Dropoff,
}

/// An atomic, immutable visit in a Job's route.
#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    pub stop_type: StopType,
    pub order_id: OrderId,
    pub coordinate: Coordinate,
    /// Merchant identity, carried through from the owning order for
    /// downstream clustering/bookkeeping; absent for dropoff stops.
    pub pickup_location_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobType {
    Single,
    Batch,
}

/// A dispatchable work package: an ordered stop sequence covering one or
/// more orders, all satisfying the pickup-before-dropoff precedence
/// invariant.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub job_type: JobType,
    pub stops: Vec<Stop>,
    pub order_ids: Vec<OrderId>,
    pub estimated_total_seconds: f64,
    pub detour_factor: f64,
    pub time_savings_seconds: f64,
}

impl Job {
    /// `job_type` is inferred from `order_ids.len()`, matching the data
    /// model note that batch size is never set independently.
    pub fn new(
        id: JobId,
        stops: Vec<Stop>,
        order_ids: Vec<OrderId>,
        estimated_total_seconds: f64,
        detour_factor: f64,
        time_savings_seconds: f64,
    ) -> Self {
        let job_type = if order_ids.len() <= 1 {
            JobType::Single
        } else {
            JobType::Batch
        };

        Self {
            id,
            job_type,
            stops,
            order_ids,
            estimated_total_seconds,
            detour_factor,
            time_savings_seconds,
        }
    }

    pub fn size(&self) -> usize {
        self.order_ids.len()
    }

    /// Every member order's PICKUP stop occurs before its DROPOFF stop —
    /// the precedence invariant.
    pub fn respects_precedence(&self) -> bool {
        for &order_id in &self.order_ids {
            let pickup_pos = self
                .stops
                .iter()
                .position(|s| s.order_id == order_id && s.stop_type == StopType::Pickup);
            let dropoff_pos = self
                .stops
                .iter()
                .position(|s| s.order_id == order_id && s.stop_type == StopType::Dropoff);

            match (pickup_pos, dropoff_pos) {
                (Some(p), Some(d)) if p < d => continue,
                _ => return false,
            }
        }
        true
    }
}
