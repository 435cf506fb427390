mod batching;
mod dispatch;

pub use batching::BatchingPolicy;
pub use dispatch::DispatchPolicy;
