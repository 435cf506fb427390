//! `RollingHorizon`: the thin driver the periodic tick task calls once
//! per cycle — promote RAW -> BATCHING, hand the pool to a
//! `BatchingEngine`, commit the resulting Jobs straight into READY. No
//! policy of its own; it only wires `OrderQueue` and `BatchingEngine`
//! together.

use batching::BatchingEngine;
use dispatch_core::job::Job;
use dispatch_core::policy::BatchingPolicy;
use geo::TimeMatrixOracle;

use crate::manager::OrderQueue;
use crate::store::OrderStore;

pub struct RollingHorizon<'a, S: OrderStore> {
    queue: &'a OrderQueue<S>,
    policy: &'a BatchingPolicy,
    oracle: &'a dyn TimeMatrixOracle,
}

impl<'a, S: OrderStore> RollingHorizon<'a, S> {
    pub fn new(queue: &'a OrderQueue<S>, policy: &'a BatchingPolicy, oracle: &'a dyn TimeMatrixOracle) -> Self {
        Self { queue, policy, oracle }
    }

    /// Runs one promote-batch-commit cycle, returning the Jobs just
    /// committed to READY (empty if nothing was eligible to batch).
    pub async fn run_cycle(&self, now: u64) -> Vec<Job> {
        let limit = self.policy.max_cluster_candidates * 10;
        let candidates = self
            .queue
            .advance_to_batching(now, 0, self.policy.batching_soft_wait_sec, limit)
            .await;

        if candidates.is_empty() {
            return Vec::new();
        }

        let engine = BatchingEngine::new(self.policy, self.oracle);
        let result = engine.batch(candidates, now).await;

        self.queue.commit_jobs(result.jobs.clone(), now).await;
        result.jobs
    }
}
