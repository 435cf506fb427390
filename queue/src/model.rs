use dispatch_core::job::JobId;

/// The two order-holding bins that `wait_seconds_in` can query. READY
/// holds Jobs, not Orders, so it has no per-order wait time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Raw,
    Batching,
}

/// What happened to the order's queue membership on `cancel`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelOutcome {
    /// The order was found in RAW or BATCHING and removed outright.
    Removed,
    /// The order was already bound into a READY job; the job is left
    /// intact and the caller (dispatcher) is responsible for shattering
    /// it at the next wave boundary via `OrderQueue::shatter_job`.
    PartOfReadyJob(JobId),
    /// The order id was not present in any bin.
    NotFound,
}
