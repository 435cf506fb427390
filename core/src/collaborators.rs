//! Collaborator interfaces: the seams the WaveDispatcher depends on
//! but does not implement. In-process default implementations live in the
//! `dispatch` crate; a real deployment swaps these for a push-notification
//! gateway, a distributed lease, and a monotonic clock source.

use async_trait::async_trait;

use crate::driver::DriverId;
use crate::job::{Job, JobId};

/// Best-effort push notification to drivers. No delivery guarantee.
#[async_trait]
pub trait PushNotifier: Send + Sync {
    async fn broadcast_offer(&self, driver_ids: &[DriverId], job: &Job);
    async fn revoke_offer(&self, driver_ids: &[DriverId], job_id: JobId);
}

/// Scoped mutual exclusion plus the active-offer/acceptance bookkeeping
/// the WaveDispatcher needs per job id.
///
/// In a single-process implementation this is a per-job mutex; in a
/// multi-node deployment it is a distributed lease. The engine does not
/// care which, provided the contract holds: the four named
/// operations below (`set_active_offer`, `is_accepted`, `mark_accepted`,
/// `get_active_drivers`) compose into `try_accept`, which *is* the
/// `lock(job_id)`-scoped critical section — the lock itself
/// is never handed back to the caller, only the already-serialized
/// outcome, so the trait cannot be used to violate the single-winner
/// invariant by forgetting to unlock.
#[async_trait]
pub trait LockManager: Send + Sync {
    async fn set_active_offer(&self, job_id: JobId, driver_ids: Vec<DriverId>, ttl_secs: u64);

    async fn is_accepted(&self, job_id: JobId) -> bool;

    /// Marks the job accepted by `driver_id`. Only ever called from
    /// within `try_accept`'s serialized critical section.
    async fn mark_accepted(&self, job_id: JobId, driver_id: DriverId);

    /// Current (unexpired) active-offer driver set for `job_id`, if any.
    async fn get_active_drivers(&self, job_id: JobId) -> Option<Vec<DriverId>>;

    /// Atomically resolves one acceptance attempt for `job_id` under a
    /// per-job mutual-exclusion scope. Returns `true` at most
    /// once per job id across all callers, ever.
    async fn try_accept(&self, job_id: JobId, driver_id: DriverId) -> bool;

    /// The WaveDispatcher's one suspension point: waits up to
    /// `timeout_secs` for `job_id` to be accepted, returning as soon as
    /// it is rather than always sleeping the full timeout. Returns
    /// whether an acceptance landed before the deadline.
    async fn await_resolution(&self, job_id: JobId, timeout_secs: u64) -> bool;

    /// The driver id that won `try_accept` for `job_id`, if any. Lets the
    /// dispatcher apply driver-state side effects once a wave
    /// resolves, without the winner having to be threaded back through
    /// `await_resolution`'s return value.
    async fn accepted_driver(&self, job_id: JobId) -> Option<DriverId>;
}

/// Monotonic clock, seconds resolution.
pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}
