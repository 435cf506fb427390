//! `QueueError`: this crate's own component-boundary error type, kept
//! separate from the `anyhow::Result` used at orchestration call sites
//! (the CLI tick loop, `main`), mirroring the teacher's split between
//! `anyhow` glue and a crate-local `thiserror` enum.

use thiserror::Error;

use dispatch_core::error::CoreError;
use dispatch_core::job::JobId;
use dispatch_core::order::OrderId;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("sqlite store error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("invalid order id in store row: {0}")]
    InvalidOrderId(#[from] uuid::Error),

    #[error("invalid order status '{0}' in store row")]
    InvalidStatus(String),

    #[error("job {job_id} is missing a pickup/dropoff stop pair for order {order_id}")]
    MissingStopPair { job_id: JobId, order_id: OrderId },

    #[error(transparent)]
    Transition(#[from] CoreError),
}
