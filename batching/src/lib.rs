//! BatchingEngine: clusters BATCHING orders, searches feasible
//! pickup/dropoff sequences, and selects disjoint Jobs via an
//! insertion-heuristic with detour-ratio acceptance.
//!
//! Reads orders, never mutates their status — `queue::OrderQueue` commits
//! whatever `BatchResult` this crate returns.

pub mod clustering;
pub mod engine;
pub mod feasibility;
pub mod selection;
pub mod types;

pub use engine::BatchingEngine;
pub use types::BatchResult;
