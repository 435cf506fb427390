//! In-process default implementations of the `dispatch-core` collaborator
//! traits: a single mutex-guarded map per job id, a `Notify` pair to
//! avoid always sleeping the full wave timeout, `tracing` for the
//! notifier, and `std::time` for the clock.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use dispatch_core::collaborators::{Clock, LockManager, PushNotifier};
use dispatch_core::driver::DriverId;
use dispatch_core::job::{Job, JobId};

struct ActiveOffer {
    driver_ids: Vec<DriverId>,
    accepted_by: Option<DriverId>,
}

/// Single-process `LockManager`: one entry per job id behind a shared
/// mutex. `try_accept` is the sole writer of `accepted_by`, so the
/// single-winner invariant holds regardless of how many callers race in
/// concurrently.
pub struct InMemoryLockManager {
    offers: Mutex<HashMap<JobId, ActiveOffer>>,
    notifiers: Mutex<HashMap<JobId, Arc<Notify>>>,
}

impl InMemoryLockManager {
    pub fn new() -> Self {
        Self {
            offers: Mutex::new(HashMap::new()),
            notifiers: Mutex::new(HashMap::new()),
        }
    }

    async fn notifier_for(&self, job_id: JobId) -> Arc<Notify> {
        let mut notifiers = self.notifiers.lock().await;
        notifiers.entry(job_id).or_insert_with(|| Arc::new(Notify::new())).clone()
    }
}

impl Default for InMemoryLockManager {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LockManager for InMemoryLockManager {
    async fn set_active_offer(&self, job_id: JobId, driver_ids: Vec<DriverId>, _ttl_secs: u64) {
        let mut offers = self.offers.lock().await;
        offers.insert(
            job_id,
            ActiveOffer {
                driver_ids,
                accepted_by: None,
            },
        );
    }

    async fn is_accepted(&self, job_id: JobId) -> bool {
        let offers = self.offers.lock().await;
        offers.get(&job_id).map(|o| o.accepted_by.is_some()).unwrap_or(false)
    }

    async fn mark_accepted(&self, job_id: JobId, driver_id: DriverId) {
        let mut offers = self.offers.lock().await;
        if let Some(offer) = offers.get_mut(&job_id) {
            offer.accepted_by = Some(driver_id);
        }
    }

    async fn get_active_drivers(&self, job_id: JobId) -> Option<Vec<DriverId>> {
        let offers = self.offers.lock().await;
        offers.get(&job_id).map(|o| o.driver_ids.clone())
    }

    async fn try_accept(&self, job_id: JobId, driver_id: DriverId) -> bool {
        let won = {
            let mut offers = self.offers.lock().await;
            match offers.get_mut(&job_id) {
                Some(offer) if offer.accepted_by.is_none() && offer.driver_ids.contains(&driver_id) => {
                    offer.accepted_by = Some(driver_id);
                    true
                }
                _ => false,
            }
        };

        if won {
            self.notifier_for(job_id).await.notify_waiters();
        }

        won
    }

    async fn accepted_driver(&self, job_id: JobId) -> Option<DriverId> {
        let offers = self.offers.lock().await;
        offers.get(&job_id).and_then(|o| o.accepted_by.clone())
    }

    async fn await_resolution(&self, job_id: JobId, timeout_secs: u64) -> bool {
        if self.is_accepted(job_id).await {
            return true;
        }

        let notify = self.notifier_for(job_id).await;
        let result = tokio::time::timeout(Duration::from_secs(timeout_secs), notify.notified()).await;

        match result {
            Ok(()) => true,
            Err(_) => self.is_accepted(job_id).await,
        }
    }
}

/// Broadcasts offer/revoke events through `tracing` rather than an
/// actual push-notification gateway — a stand-in until one is wired in.
pub struct LoggingPushNotifier;

#[async_trait]
impl PushNotifier for LoggingPushNotifier {
    async fn broadcast_offer(&self, driver_ids: &[DriverId], job: &Job) {
        tracing::info!(job_id = %job.id, drivers = ?driver_ids, "broadcasting job offer");
    }

    async fn revoke_offer(&self, driver_ids: &[DriverId], job_id: JobId) {
        tracing::info!(%job_id, drivers = ?driver_ids, "revoking job offer");
    }
}

/// Wall-clock `Clock`, seconds since the Unix epoch.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}
