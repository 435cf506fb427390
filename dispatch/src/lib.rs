//! WaveDispatcher: broadcasts a Job to drivers through five
//! concentric waves, resolving concurrent driver acceptance under a
//! per-job mutual-exclusion collaborator, and revoking losers.

pub mod collaborators;
pub mod dispatcher;
pub mod router;
pub mod types;
pub mod waves;

pub use collaborators::{InMemoryLockManager, LoggingPushNotifier, SystemClock};
pub use dispatcher::{resolve_acceptance, DispatchError, WaveDispatcher};
pub use router::JobDispatchRouter;
pub use types::DispatchOutcome;
