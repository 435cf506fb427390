use thiserror::Error;

/// Shared leaf errors used across `queue`, `batching`, and `dispatch`.
/// Component-specific failure taxonomies live in each crate's own
/// error enum; this one only holds what's common to the domain types
/// themselves.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid policy: {0}")]
    InvalidPolicy(String),

    #[error("order {0} not found")]
    OrderNotFound(String),

    #[error("job {0} not found")]
    JobNotFound(String),

    #[error("invalid state transition: {0}")]
    InvalidTransition(String),
}
