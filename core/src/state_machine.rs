//! Validation of Order status transitions, plus the named Order/Driver
//! transition helpers that `queue` and `dispatch` call by name rather
//! than inlining the field assignment themselves.

use crate::driver::{Driver, DriverStatus};
use crate::error::CoreError;
use crate::job::Job;
use crate::order::{Order, OrderStatus};

/// Returns whether moving an order from `from` to `to` is a legal edge in
/// the RAW -> BATCHING -> READY -> ASSIGNED lifecycle, with CANCELLED
/// reachable from any non-terminal state.
pub fn is_valid_transition(from: OrderStatus, to: OrderStatus) -> bool {
    use OrderStatus::*;

    match (from, to) {
        (Raw, Batching) => true,
        (Batching, Ready) => true,
        (Ready, Assigned) => true,
        (Raw, Cancelled) | (Batching, Cancelled) | (Ready, Cancelled) => true,
        _ => false,
    }
}

/// RAW or BATCHING -> BATCHING. Any other starting state is a programmer
/// error: the caller is expected to have already filtered on stage.
pub fn transition_order_to_batching(order: &Order) -> Result<Order, CoreError> {
    if !matches!(order.status, OrderStatus::Raw | OrderStatus::Batching) {
        return Err(CoreError::InvalidTransition(format!(
            "order {} cannot move to BATCHING from {}",
            order.id, order.status
        )));
    }
    let mut next = order.clone();
    next.status = OrderStatus::Batching;
    Ok(next)
}

/// READY -> ASSIGNED for every order in a winning Job. Rejects (without
/// partially applying) if any order is not currently READY.
pub fn transition_orders_to_assigned(orders: &[Order]) -> Result<Vec<Order>, CoreError> {
    orders
        .iter()
        .map(|order| {
            if order.status != OrderStatus::Ready {
                return Err(CoreError::InvalidTransition(format!(
                    "order {} cannot move to ASSIGNED from {}",
                    order.id, order.status
                )));
            }
            let mut next = order.clone();
            next.status = OrderStatus::Assigned;
            Ok(next)
        })
        .collect()
}

/// Applies the driver-state side effects of a successful job acceptance:
/// capacity is decremented by the job's order count, and status
/// transitions to TRANSIT_TO_COLLECT once capacity is exhausted (or
/// immediately, if continuous chaining is enabled and headroom remains).
/// Rejects if the driver's `max_capacity` can't cover the job at all.
pub fn handle_driver_acceptance(
    driver: &Driver,
    job: &Job,
    enable_continuous_chaining: bool,
) -> Result<Driver, CoreError> {
    let job_size = job.size() as u32;
    if driver.max_capacity < job_size {
        return Err(CoreError::InvalidTransition(format!(
            "driver {} capacity {} cannot cover job {} of size {}",
            driver.id, driver.max_capacity, job.id, job_size
        )));
    }

    let mut next = driver.clone();
    next.remaining_capacity = next.remaining_capacity.saturating_sub(job_size);
    next.status = if next.remaining_capacity == 0 {
        DriverStatus::TransitToCollect
    } else if enable_continuous_chaining {
        DriverStatus::TransitToCollect
    } else {
        DriverStatus::Available
    };
    Ok(next)
}

/// Driver withdrawal/breakdown is treated as an emergency fallback, not
/// a graceful retry: the driver is pulled from the eligible pool
/// unconditionally rather than cooled down and re-offered automatically.
pub fn handle_driver_cancellation(driver: &Driver) -> Driver {
    let mut next = driver.clone();
    next.status = DriverStatus::Offline;
    next
}
