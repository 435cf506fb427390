//! TimeMatrixOracle: bulk travel-time lookups between coordinate
//! sets, process-local cached, used as a pure oracle by `queue`,
//! `batching` and `dispatch`. Never mutates entities, never decides
//! policy.

pub mod fallback;
pub mod oracle;

pub use fallback::EuclideanRouteFetcher;
pub use oracle::{CachingTimeMatrixOracle, RouteFetcher, TimeMatrixOracle};
