use dispatch_core::job::Job;
use dispatch_core::order::Order;

/// Output of one `BatchingEngine::batch` call. `unbatched_orders`
/// is exactly the input orders not present in any emitted job's
/// order-id list.
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    pub jobs: Vec<Job>,
    pub unbatched_orders: Vec<Order>,
}
