//! Shared domain types for the dispatch engine: orders, stops, jobs,
//! drivers, the two policy bundles, collaborator traits, and the small
//! state-transition helpers used by `queue`, `batching`, and `dispatch`.

pub mod collaborators;
pub mod coordinate;
pub mod driver;
pub mod error;
pub mod job;
pub mod order;
pub mod policy;
pub mod state_machine;

pub use coordinate::Coordinate;
pub use driver::{Driver, DriverStatus};
pub use error::CoreError;
pub use job::{Job, JobType, Stop, StopType};
pub use order::{Order, OrderStatus};
pub use policy::{BatchingPolicy, DispatchPolicy};
