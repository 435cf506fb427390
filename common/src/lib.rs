//! Ambient logging helpers shared across the workspace's crates.

pub mod logger;

pub use logger::init_logger;
pub use logger::trace_id::TraceId;
