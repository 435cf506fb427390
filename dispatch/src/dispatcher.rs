//! The WaveDispatcher itself: drives one Job through its
//! five waves, delegating acceptance races to `resolve_acceptance` and
//! driver-state transitions to the caller via the returned outcome.

use std::sync::Arc;

use thiserror::Error;

use dispatch_core::collaborators::{LockManager, PushNotifier};
use dispatch_core::coordinate::Coordinate;
use dispatch_core::driver::{Driver, DriverId};
use dispatch_core::job::{Job, JobId};
use dispatch_core::policy::DispatchPolicy;
use geo::TimeMatrixOracle;

use crate::types::DispatchOutcome;
use crate::waves::build_waves;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("no eligible drivers found in any wave for job {0}")]
    Exhausted(JobId),
}

/// Resolves one driver's acceptance attempt for `job_id`. This
/// is the function a driver-facing handler calls when a courier taps
/// "accept" — it is deliberately free-standing rather than a
/// `WaveDispatcher` method, since acceptance can race in from outside
/// the broadcasting task entirely.
///
/// Returns `true` only for the single driver that wins the race for this
/// job; every other concurrent caller, including ones that arrive after
/// the job already resolved, gets `false`.
pub async fn resolve_acceptance(
    lock: &dyn LockManager,
    notifier: &dyn PushNotifier,
    job_id: JobId,
    driver_id: DriverId,
) -> bool {
    if lock.is_accepted(job_id).await {
        return false;
    }

    let active = match lock.get_active_drivers(job_id).await {
        Some(active) if active.contains(&driver_id) => active,
        _ => return false,
    };

    let won = lock.try_accept(job_id, driver_id.clone()).await;

    if won {
        let losers: Vec<DriverId> = active.into_iter().filter(|d| *d != driver_id).collect();
        if !losers.is_empty() {
            notifier.revoke_offer(&losers, job_id).await;
        }
    }

    won
}

/// Broadcasts a Job through up to five concentric driver waves, waiting
/// at most `wave_timeout_seconds` per wave, and returns as soon as one
/// wave produces a winner.
pub struct WaveDispatcher {
    policy: DispatchPolicy,
    oracle: Option<Arc<dyn TimeMatrixOracle>>,
    lock: Arc<dyn LockManager>,
    notifier: Arc<dyn PushNotifier>,
}

impl WaveDispatcher {
    pub fn new(policy: DispatchPolicy, lock: Arc<dyn LockManager>, notifier: Arc<dyn PushNotifier>) -> Self {
        Self {
            policy,
            oracle: None,
            lock,
            notifier,
        }
    }

    pub fn with_oracle(mut self, oracle: Arc<dyn TimeMatrixOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    /// Runs the full five-wave broadcast for `job`. Empty waves are
    /// skipped without waiting out the timeout, matching the cascade
    /// scenario where an un-populated inner wave costs nothing.
    pub async fn dispatch_job(
        &self,
        job: &Job,
        pickup: Coordinate,
        drivers: &[Driver],
        required_capacity: u32,
    ) -> DispatchOutcome {
        let waves = build_waves(
            pickup,
            drivers,
            required_capacity,
            &self.policy,
            self.oracle.as_deref(),
        )
        .await;

        for wave in waves {
            if wave.is_empty() {
                continue;
            }

            let driver_ids: Vec<DriverId> = wave.iter().map(|d| d.id.clone()).collect();

            self.lock
                .set_active_offer(job.id, driver_ids.clone(), self.policy.wave_timeout_seconds)
                .await;
            self.notifier.broadcast_offer(&driver_ids, job).await;

            let accepted = self
                .lock
                .await_resolution(job.id, self.policy.wave_timeout_seconds)
                .await;

            if accepted {
                if let Some(driver_id) = self.lock.accepted_driver(job.id).await {
                    return DispatchOutcome::Assigned { driver_id };
                }
            }

            self.notifier.revoke_offer(&driver_ids, job.id).await;
        }

        DispatchOutcome::Exhausted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{InMemoryLockManager, LoggingPushNotifier};
    use dispatch_core::driver::DriverStatus;
    use dispatch_core::job::{Stop, StopType};
    use dispatch_core::order::OrderId;
    use tokio::time::Instant;

    fn single_stop_job() -> Job {
        let order_id = OrderId::new_v4();
        Job::new(
            JobId::new_v4(),
            vec![
                Stop {
                    stop_type: StopType::Pickup,
                    order_id,
                    coordinate: Coordinate::new(0.0, 0.0),
                    pickup_location_id: None,
                },
                Stop {
                    stop_type: StopType::Dropoff,
                    order_id,
                    coordinate: Coordinate::new(0.01, 0.0),
                    pickup_location_id: None,
                },
            ],
            vec![order_id],
            120.0,
            1.0,
            0.0,
        )
    }

    fn driver(id: &str, lat: f64) -> Driver {
        Driver::new(id, Coordinate::new(lat, 0.0), DriverStatus::Available).with_capacity(1)
    }

    #[tokio::test(start_paused = true)]
    async fn first_wave_acceptance_resolves_without_exhausting_later_waves() {
        let mut policy = DispatchPolicy::default();
        policy.wave_timeout_seconds = 5;
        let lock = Arc::new(InMemoryLockManager::new());
        let notifier = Arc::new(LoggingPushNotifier);
        let dispatcher = WaveDispatcher::new(policy, lock.clone(), notifier);

        let job = single_stop_job();
        let drivers = vec![driver("a", 0.001)];

        let lock_for_acceptor = lock.clone();
        let job_id = job.id;
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            lock_for_acceptor.try_accept(job_id, "a".to_string()).await;
        });

        let outcome = dispatcher
            .dispatch_job(&job, Coordinate::new(0.0, 0.0), &drivers, 1)
            .await;

        assert_eq!(outcome, DispatchOutcome::Assigned { driver_id: "a".to_string() });
    }

    #[tokio::test(start_paused = true)]
    async fn no_eligible_drivers_anywhere_exhausts_all_waves() {
        let mut policy = DispatchPolicy::default();
        policy.wave_timeout_seconds = 1;
        let lock = Arc::new(InMemoryLockManager::new());
        let notifier = Arc::new(LoggingPushNotifier);
        let dispatcher = WaveDispatcher::new(policy, lock, notifier);

        let job = single_stop_job();
        let outcome = dispatcher
            .dispatch_job(&job, Coordinate::new(0.0, 0.0), &[], 1)
            .await;

        assert_eq!(outcome, DispatchOutcome::Exhausted);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_inner_waves_are_skipped_without_waiting_out_their_timeout() {
        let mut policy = DispatchPolicy::default();
        policy.wave_timeout_seconds = 30;
        policy.wave_radii_degrees = [0.001, 0.002, 0.003, 0.004, 0.2];
        let lock = Arc::new(InMemoryLockManager::new());
        let notifier = Arc::new(LoggingPushNotifier);
        let dispatcher = WaveDispatcher::new(policy, lock, notifier);

        let job = single_stop_job();
        let drivers = vec![driver("far", 0.1)];

        let start = Instant::now();
        let outcome = dispatcher
            .dispatch_job(&job, Coordinate::new(0.0, 0.0), &drivers, 1)
            .await;
        let elapsed = start.elapsed();

        assert_eq!(outcome, DispatchOutcome::Exhausted);
        assert!(elapsed < std::time::Duration::from_secs(35));
    }

    #[tokio::test]
    async fn resolve_acceptance_rejects_second_driver_after_first_wins() {
        let lock = InMemoryLockManager::new();
        let notifier = LoggingPushNotifier;
        let job_id = JobId::new_v4();
        lock.set_active_offer(job_id, vec!["a".into(), "b".into()], 30).await;

        let first = resolve_acceptance(&lock, &notifier, job_id, "a".to_string()).await;
        let second = resolve_acceptance(&lock, &notifier, job_id, "b".to_string()).await;

        assert!(first);
        assert!(!second);
    }

    #[tokio::test]
    async fn resolve_acceptance_rejects_driver_outside_active_offer() {
        let lock = InMemoryLockManager::new();
        let notifier = LoggingPushNotifier;
        let job_id = JobId::new_v4();
        lock.set_active_offer(job_id, vec!["a".into()], 30).await;

        assert!(!resolve_acceptance(&lock, &notifier, job_id, "stranger".to_string()).await);
    }
}
