//! Insertion-heuristic selection: builds disjoint Jobs out of
//! one cluster by greedily inserting the highest-gain candidate order
//! until no positive-gain insertion remains or the batch size cap is
//! hit.

use dispatch_core::job::Job;
use dispatch_core::order::Order;
use dispatch_core::policy::BatchingPolicy;
use geo::TimeMatrixOracle;

use crate::feasibility::{self, FeasibilityResult};

struct OpenJob {
    stops: Vec<dispatch_core::job::Stop>,
    order_ids: Vec<uuid::Uuid>,
    single_sum: f64,
    batch_time: f64,
}

impl OpenJob {
    fn savings(&self) -> f64 {
        self.single_sum - self.batch_time
    }

    fn detour_factor(&self) -> f64 {
        if self.single_sum <= 0.0 {
            1.0
        } else {
            self.batch_time / self.single_sum
        }
    }
}

fn age(order: &Order, now: u64) -> u64 {
    order.age_seconds(now)
}

/// Orders `(id, age-desc, id-asc)` tie-break for deterministic selection.
fn older_first_then_id(a: &Order, b: &Order, now: u64) -> std::cmp::Ordering {
    age(b, now).cmp(&age(a, now)).then(a.id.cmp(&b.id))
}

/// Builds as many Jobs as the cluster supports, returning them plus
/// whatever orders were left unbatched (either deferred under rolling
/// horizon, or simply exhausted with no positive-gain insertion left).
pub async fn select_jobs_for_cluster(
    mut remaining: Vec<Order>,
    policy: &BatchingPolicy,
    oracle: &dyn TimeMatrixOracle,
    now: u64,
) -> (Vec<Job>, Vec<Order>) {
    if policy.prefer_older_orders {
        remaining.sort_by(|a, b| older_first_then_id(a, b, now));
    }

    let mut jobs = Vec::new();
    let mut unbatched = Vec::new();

    while !remaining.is_empty() {
        let seed = remaining.remove(0);

        let seed_feasibility = feasibility::solve_base_case(std::slice::from_ref(&seed), oracle).await;
        let Some(seed_stops) = seed_feasibility.best_sequence else {
            // Oracle can't route the seed's own pickup->dropoff; skip it.
            continue;
        };

        let mut job = OpenJob {
            stops: seed_stops,
            order_ids: vec![seed.id],
            single_sum: seed_feasibility.best_time_seconds,
            batch_time: seed_feasibility.best_time_seconds,
        };

        loop {
            if job.order_ids.len() >= policy.max_batch_size || remaining.is_empty() {
                break;
            }

            let cap = if job.order_ids.len() + 1 == 2 {
                policy.pair_detour_cap
            } else {
                policy.multi_detour_cap
            };

            let current_savings = job.savings();
            let mut best: Option<(usize, f64, FeasibilityResult, f64, f64)> = None;

            for (idx, candidate) in remaining.iter().enumerate() {
                let insertion = feasibility::solve_insertion(
                    &job.stops,
                    candidate,
                    oracle,
                    policy.max_candidate_pairs,
                )
                .await;

                if !insertion.feasible {
                    continue;
                }

                let own_leg =
                    feasibility::solve_base_case(std::slice::from_ref(candidate), oracle).await;
                if !own_leg.feasible {
                    continue;
                }

                let new_single_sum = job.single_sum + own_leg.best_time_seconds;
                let new_batch_time = insertion.best_time_seconds;
                if new_single_sum <= 0.0 {
                    continue;
                }
                let detour = new_batch_time / new_single_sum;
                if detour > cap {
                    continue;
                }

                let savings = new_single_sum - new_batch_time;
                let score = if policy.prefer_older_orders {
                    savings + policy.age_weight * age(candidate, now) as f64
                } else {
                    savings
                };
                let gain = score - current_savings;

                if gain <= 0.0 {
                    continue;
                }

                let better = match &best {
                    None => true,
                    Some((best_idx, best_gain, ..)) => {
                        if gain > *best_gain {
                            true
                        } else if gain < *best_gain {
                            false
                        } else {
                            older_first_then_id(candidate, &remaining[*best_idx], now)
                                == std::cmp::Ordering::Less
                        }
                    }
                };

                if better {
                    best = Some((idx, gain, insertion, new_single_sum, new_batch_time));
                }
            }

            match best {
                Some((idx, _gain, insertion, new_single_sum, new_batch_time)) => {
                    let candidate = remaining.remove(idx);
                    job.stops = insertion.best_sequence.expect("checked feasible above");
                    job.order_ids.push(candidate.id);
                    job.single_sum = new_single_sum;
                    job.batch_time = new_batch_time;
                }
                None => break,
            }
        }

        if job.order_ids.len() == 1
            && policy.enable_rolling_horizon
            && age(&seed, now) < policy.max_wait_time_seconds
        {
            unbatched.push(seed);
            continue;
        }

        let detour_factor = job.detour_factor();
        let savings = job.savings();
        jobs.push(Job::new(
            uuid::Uuid::new_v4(),
            job.stops,
            job.order_ids,
            job.batch_time,
            detour_factor,
            savings,
        ));
    }

    (jobs, unbatched)
}
