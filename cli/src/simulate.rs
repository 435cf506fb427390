//! Wires `queue` + `batching` + `dispatch` into the periodic tick loop
//! the `ingest` subcommand runs: each tick runs one `RollingHorizon`
//! promote-batch-commit cycle, then pops whatever landed in READY and
//! hands each job to a `JobDispatchRouter` for wave dispatch.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use dispatch_core::driver::Driver;
use dispatch_core::order::Order;
use dispatch_core::policy::{BatchingPolicy, DispatchPolicy};
use dispatch_core::state_machine::handle_driver_acceptance;

use dispatch::{DispatchOutcome, InMemoryLockManager, JobDispatchRouter, LoggingPushNotifier, WaveDispatcher};
use geo::{CachingTimeMatrixOracle, EuclideanRouteFetcher};
use queue::store::memory_store::InMemoryOrderStore;
use queue::{OrderQueue, RollingHorizon};

use crate::config::DispatchConfig;

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Runs `ticks` batching/dispatch cycles over `orders`/`drivers`,
/// returning the count of Jobs successfully assigned to a driver.
pub async fn run_simulation(
    orders: Vec<Order>,
    mut drivers: Vec<Driver>,
    ticks: u32,
    config: &DispatchConfig,
) -> anyhow::Result<u32> {
    let batching_policy = BatchingPolicy::default();
    batching_policy.validate()?;
    let dispatch_policy = DispatchPolicy::default();
    dispatch_policy.validate()?;

    let store = Arc::new(InMemoryOrderStore::new());
    let queue = OrderQueue::new(store).await?;

    let now = now_secs();
    for order in orders {
        queue.enqueue_raw(order, now).await?;
    }

    let oracle = Arc::new(CachingTimeMatrixOracle::new(Arc::new(EuclideanRouteFetcher::new(35.0))));
    let horizon = RollingHorizon::new(&queue, &batching_policy, oracle.as_ref());

    let lock = Arc::new(InMemoryLockManager::new());
    let notifier = Arc::new(LoggingPushNotifier);
    let dispatcher = Arc::new(
        WaveDispatcher::new(dispatch_policy.clone(), lock, notifier).with_oracle(oracle.clone()),
    );
    let router = JobDispatchRouter::new(dispatcher, config.job_channel_capacity);

    let mut assigned_count = 0;

    for tick in 0..ticks {
        let now = now_secs();
        tracing::info!(tick, "starting batching/dispatch tick");

        let committed = horizon.run_cycle(now).await;
        if committed.is_empty() {
            tracing::info!(tick, "no jobs committed this cycle");
            continue;
        }
        tracing::info!(tick, jobs = committed.len(), "batching cycle committed jobs to READY");

        let ready_jobs = queue.pop_ready(committed.len()).await;
        for job in ready_jobs {
            let pickup = job
                .stops
                .first()
                .map(|s| s.coordinate)
                .expect("a committed job always has at least one stop");

            let reply = router
                .dispatch(
                    job.clone(),
                    pickup,
                    drivers.clone(),
                    dispatch_policy.default_required_capacity,
                )
                .await;
            let outcome = reply.await.unwrap_or(DispatchOutcome::Exhausted);

            match outcome {
                DispatchOutcome::Assigned { driver_id } => {
                    tracing::info!(job_id = %job.id, %driver_id, "job assigned");
                    assigned_count += 1;

                    if let Err(err) = queue.mark_assigned(&job, now_secs()) {
                        tracing::warn!(job_id = %job.id, %err, "order state-machine rejected assignment");
                    }

                    if let Some(slot) = drivers.iter_mut().find(|d| d.id == driver_id) {
                        match handle_driver_acceptance(
                            slot,
                            &job,
                            batching_policy.enable_continuous_chaining,
                        ) {
                            Ok(next) => *slot = next,
                            Err(err) => tracing::warn!(
                                job_id = %job.id, %driver_id, %err,
                                "driver acceptance side effects rejected"
                            ),
                        }
                    }
                }
                DispatchOutcome::Exhausted => {
                    tracing::warn!(job_id = %job.id, "job dispatch exhausted; shattering back to RAW");
                    queue.shatter_job(job.id, now_secs()).await;
                }
            }
        }
    }

    Ok(assigned_count)
}
