//! `OrderQueue`: the in-memory live set plus an optional durable store.
//!
//! Mirrors the shape of a session manager that keeps a live index and
//! mirrors writes to a pluggable store: mutating operations are exposed
//! as atomic critical sections guarded by a single coarse mutex, since
//! the queue itself is never the bottleneck.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use tokio::sync::Mutex;

use dispatch_core::job::{Job, JobId};
use dispatch_core::order::{Order, OrderId, OrderStatus};

use crate::error::QueueError;
use crate::model::{CancelOutcome, Stage};
use crate::store::OrderStore;

struct Timed {
    order: Order,
    entered_at: u64,
}

/// Owns the RAW -> BATCHING -> READY -> ASSIGNED lifecycle for a pool of
/// orders. An order id is a member of at most one bin at any time.
pub struct OrderQueue<S: OrderStore> {
    raw: Mutex<HashMap<OrderId, Timed>>,
    batching: Mutex<HashMap<OrderId, Timed>>,
    ready: Mutex<VecDeque<Job>>,
    store: Arc<S>,
}

impl<S: OrderStore> OrderQueue<S> {
    /// Rebuilds the RAW bin from the store; BATCHING/READY membership is
    /// not itself durable — a restart re-batches from RAW.
    pub async fn new(store: Arc<S>) -> Result<Self, QueueError> {
        let restored = store.load_all().await?;
        let mut raw = HashMap::new();
        for order in restored {
            if order.status == OrderStatus::Raw {
                let entered_at = order.created_at_secs;
                raw.insert(order.id, Timed { order, entered_at });
            }
        }

        Ok(Self {
            raw: Mutex::new(raw),
            batching: Mutex::new(HashMap::new()),
            ready: Mutex::new(VecDeque::new()),
            store,
        })
    }

    /// Idempotent on id: a second `enqueue_raw` for an id already
    /// present in any bin is a no-op.
    pub async fn enqueue_raw(&self, mut order: Order, now: u64) -> Result<(), QueueError> {
        if self.contains(order.id).await {
            return Ok(());
        }

        order.status = OrderStatus::Raw;
        self.store.save(&order).await?;

        let mut raw = self.raw.lock().await;
        raw.insert(
            order.id,
            Timed {
                order,
                entered_at: now,
            },
        );
        Ok(())
    }

    async fn contains(&self, id: OrderId) -> bool {
        if self.raw.lock().await.contains_key(&id) {
            return true;
        }
        if self.batching.lock().await.contains_key(&id) {
            return true;
        }
        let ready = self.ready.lock().await;
        ready.iter().any(|j| j.order_ids.contains(&id))
    }

    /// Moves eligible RAW orders into BATCHING, at most `limit` of them,
    /// returned in arrival order. An order is eligible if it has
    /// aged past `max_raw_age_sec`, or `ready_horizon_sec == 0`, or its
    /// `ready_at` is unknown, or its `ready_at` falls within the horizon.
    pub async fn advance_to_batching(
        &self,
        now: u64,
        ready_horizon_sec: u64,
        max_raw_age_sec: u64,
        limit: usize,
    ) -> Vec<Order> {
        let mut raw = self.raw.lock().await;

        let mut candidates: Vec<OrderId> = raw.keys().copied().collect();
        candidates.sort_by_key(|id| raw[id].entered_at);

        let mut moved = Vec::new();
        let mut batching = self.batching.lock().await;

        for id in candidates {
            if moved.len() >= limit {
                break;
            }
            let timed = &raw[&id];
            let aged_out = now.saturating_sub(timed.entered_at) >= max_raw_age_sec;
            let ready_eligible = ready_horizon_sec == 0
                || match timed.order.ready_at_secs {
                    None => true,
                    Some(ready_at) => ready_at <= now + ready_horizon_sec,
                };

            if aged_out || ready_eligible {
                let timed = raw.remove(&id).expect("key came from raw.keys()");
                let order = dispatch_core::state_machine::transition_order_to_batching(&timed.order)
                    .expect("order taken from the RAW bin is always RAW or BATCHING");
                moved.push(order.clone());
                batching.insert(
                    id,
                    Timed {
                        order,
                        entered_at: now,
                    },
                );
            }
        }

        moved
    }

    /// Commits finalized jobs: every referenced order moves BATCHING ->
    /// READY, and the jobs are appended to the READY FIFO. All orders
    /// referenced by `jobs` must currently be in BATCHING — a violation
    /// is a programmer error and panics. Takes `now` for signature
    /// symmetry with the other lifecycle transitions; READY membership
    /// isn't durable (see the store's module doc), so there's no
    /// timing record to stamp it into.
    pub async fn commit_jobs(&self, jobs: Vec<Job>, _now: u64) {
        let mut batching = self.batching.lock().await;
        let mut ready = self.ready.lock().await;

        for job in &jobs {
            for order_id in &job.order_ids {
                batching.remove(order_id).unwrap_or_else(|| {
                    panic!(
                        "commit_jobs: order {order_id} referenced by job {} is not in BATCHING",
                        job.id
                    )
                });
            }
        }

        ready.extend(jobs);
    }

    /// FIFO pop of up to `n` ready jobs.
    pub async fn pop_ready(&self, n: usize) -> Vec<Job> {
        let mut ready = self.ready.lock().await;
        let take = n.min(ready.len());
        ready.drain(..take).collect()
    }

    /// Removes an order from whichever bin holds it and marks it
    /// CANCELLED, dropping its timing record. If the order is bound into
    /// a not-yet-popped READY job, the job is left intact and the job id
    /// is returned for dispatcher-level handling.
    pub async fn cancel(&self, order_id: OrderId) -> Result<CancelOutcome, QueueError> {
        if self.raw.lock().await.remove(&order_id).is_some() {
            self.store.delete(order_id).await?;
            return Ok(CancelOutcome::Removed);
        }
        if self.batching.lock().await.remove(&order_id).is_some() {
            self.store.delete(order_id).await?;
            return Ok(CancelOutcome::Removed);
        }

        let ready = self.ready.lock().await;
        if let Some(job) = ready.iter().find(|j| j.order_ids.contains(&order_id)) {
            return Ok(CancelOutcome::PartOfReadyJob(job.id));
        }

        Ok(CancelOutcome::NotFound)
    }

    /// Shatters a job's constituent orders back to RAW, removing the
    /// job from READY. Used by the dispatcher after a
    /// `CancelOutcome::PartOfReadyJob` or a dispatch-exhausted job.
    pub async fn shatter_job(&self, job_id: JobId, now: u64) -> Vec<OrderId> {
        use dispatch_core::job::StopType;

        let mut ready = self.ready.lock().await;
        let Some(pos) = ready.iter().position(|j| j.id == job_id) else {
            return Vec::new();
        };
        let job = ready.remove(pos).expect("position just located");
        drop(ready);

        let mut raw = self.raw.lock().await;
        for order_id in &job.order_ids {
            let pickup_stop = job
                .stops
                .iter()
                .find(|s| s.order_id == *order_id && s.stop_type == StopType::Pickup);
            let dropoff = job
                .stops
                .iter()
                .find(|s| s.order_id == *order_id && s.stop_type == StopType::Dropoff)
                .map(|s| s.coordinate);

            if let (Some(pickup_stop), Some(dropoff)) = (pickup_stop, dropoff) {
                raw.insert(
                    *order_id,
                    Timed {
                        order: Order {
                            id: *order_id,
                            pickup: pickup_stop.coordinate,
                            dropoff,
                            merchant_id: pickup_stop.pickup_location_id.clone(),
                            created_at_secs: now,
                            ready_at_secs: None,
                            status: OrderStatus::Raw,
                        },
                        entered_at: now,
                    },
                );
            }
        }

        job.order_ids
    }

    /// Reconstructs `job`'s member orders from its stops (the same
    /// pattern `shatter_job` uses) and runs them through
    /// `transition_orders_to_assigned`, for state-machine parity once a
    /// wave dispatch accepts this job. The queue itself owns nothing
    /// further about these orders past this point — they already left
    /// READY via `pop_ready`.
    pub fn mark_assigned(&self, job: &Job, now: u64) -> Result<Vec<Order>, QueueError> {
        use dispatch_core::job::StopType;
        use dispatch_core::state_machine::transition_orders_to_assigned;

        let mut orders = Vec::with_capacity(job.order_ids.len());
        for order_id in &job.order_ids {
            let pickup_stop = job
                .stops
                .iter()
                .find(|s| s.order_id == *order_id && s.stop_type == StopType::Pickup);
            let dropoff = job
                .stops
                .iter()
                .find(|s| s.order_id == *order_id && s.stop_type == StopType::Dropoff)
                .map(|s| s.coordinate);

            let (pickup_stop, dropoff) = match (pickup_stop, dropoff) {
                (Some(p), Some(d)) => (p, d),
                _ => {
                    return Err(QueueError::MissingStopPair {
                        job_id: job.id,
                        order_id: *order_id,
                    })
                }
            };

            orders.push(Order {
                id: *order_id,
                pickup: pickup_stop.coordinate,
                dropoff,
                merchant_id: pickup_stop.pickup_location_id.clone(),
                created_at_secs: now,
                ready_at_secs: None,
                status: OrderStatus::Ready,
            });
        }

        Ok(transition_orders_to_assigned(&orders)?)
    }

    /// Elapsed seconds since the order entered `stage`, or `None` if the
    /// order is not currently in that bin.
    pub async fn wait_seconds_in(&self, stage: Stage, order_id: OrderId, now: u64) -> Option<u64> {
        let bin = match stage {
            Stage::Raw => &self.raw,
            Stage::Batching => &self.batching,
        };
        let bin = bin.lock().await;
        bin.get(&order_id)
            .map(|t| now.saturating_sub(t.entered_at))
    }
}
