//! `JobDispatchRouter`: spawns a dedicated worker task per finalized Job
//! id, generalizing the per-resource-key router/worker split to wave
//! dispatch. Unlike a long-lived resource (a trading pair, a session),
//! a job id is only ever dispatched once: each `WaveWorker` processes
//! exactly one job, reports its outcome, and purges its own entry from
//! the router's map rather than looping over a persistent channel.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, Mutex};

use dispatch_core::coordinate::Coordinate;
use dispatch_core::driver::Driver;
use dispatch_core::job::{Job, JobId};

use crate::dispatcher::WaveDispatcher;
use crate::types::DispatchOutcome;

struct DispatchCommand {
    job: Job,
    pickup: Coordinate,
    drivers: Vec<Driver>,
    required_capacity: u32,
    reply: oneshot::Sender<DispatchOutcome>,
}

/// Routes finalized Jobs to one-shot `WaveWorker` tasks. `resolve_acceptance`
/// deliberately stays outside this router: a driver's "accept" tap must
/// resolve synchronously against the shared `LockManager`, not wait on a
/// worker's turn at a channel.
pub struct JobDispatchRouter {
    dispatcher: Arc<WaveDispatcher>,
    job_channel_capacity: usize,
    job_txs: Arc<Mutex<HashMap<JobId, mpsc::Sender<DispatchCommand>>>>,
}

impl JobDispatchRouter {
    pub fn new(dispatcher: Arc<WaveDispatcher>, job_channel_capacity: usize) -> Self {
        Self {
            dispatcher,
            job_channel_capacity: job_channel_capacity.max(1),
            job_txs: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Spawns a dedicated worker for `job` and hands it the one command
    /// it will ever receive. Returns a receiver that resolves once the
    /// worker's five-wave broadcast completes (accepted or exhausted).
    ///
    /// A second call with the same job id before the first resolves
    /// reuses the existing worker's channel rather than spawning a
    /// duplicate — this only matters if a caller mistakenly dispatches
    /// the same job twice concurrently, since a finalized job is
    /// popped out of READY exactly once in normal operation.
    pub async fn dispatch(
        &self,
        job: Job,
        pickup: Coordinate,
        drivers: Vec<Driver>,
        required_capacity: u32,
    ) -> oneshot::Receiver<DispatchOutcome> {
        let job_id = job.id;
        let (reply_tx, reply_rx) = oneshot::channel();

        let tx = {
            let mut txs = self.job_txs.lock().await;
            if let Some(existing) = txs.get(&job_id) {
                existing.clone()
            } else {
                let (tx, rx) = mpsc::channel(self.job_channel_capacity);
                txs.insert(job_id, tx.clone());

                let dispatcher = self.dispatcher.clone();
                let job_txs = self.job_txs.clone();
                tokio::spawn(async move {
                    WaveWorker::new(dispatcher, job_id).run(rx).await;
                    job_txs.lock().await.remove(&job_id);
                });

                tx
            }
        };

        let _ = tx
            .send(DispatchCommand {
                job,
                pickup,
                drivers,
                required_capacity,
                reply: reply_tx,
            })
            .await;

        reply_rx
    }
}

/// Runs the five-wave broadcast for a single job id, reports the
/// outcome through the one-shot reply channel, then exits.
struct WaveWorker {
    dispatcher: Arc<WaveDispatcher>,
    job_id: JobId,
}

impl WaveWorker {
    fn new(dispatcher: Arc<WaveDispatcher>, job_id: JobId) -> Self {
        Self { dispatcher, job_id }
    }

    async fn run(self, mut rx: mpsc::Receiver<DispatchCommand>) {
        if let Some(cmd) = rx.recv().await {
            debug_assert_eq!(cmd.job.id, self.job_id);
            let outcome = self
                .dispatcher
                .dispatch_job(&cmd.job, cmd.pickup, &cmd.drivers, cmd.required_capacity)
                .await;
            let _ = cmd.reply.send(outcome);
        }
    }
}
