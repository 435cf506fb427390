//! `BatchingEngine`: the entry point that ties clustering, feasibility
//! search and selection together for one batching-tick invocation over
//! the current BATCHING pool.

use dispatch_core::order::Order;
use dispatch_core::policy::BatchingPolicy;
use geo::TimeMatrixOracle;

use crate::clustering;
use crate::selection;
use crate::types::BatchResult;

pub struct BatchingEngine<'a> {
    policy: &'a BatchingPolicy,
    oracle: &'a dyn TimeMatrixOracle,
    near_pickup_oracle: Option<&'a dyn TimeMatrixOracle>,
}

impl<'a> BatchingEngine<'a> {
    pub fn new(policy: &'a BatchingPolicy, oracle: &'a dyn TimeMatrixOracle) -> Self {
        Self {
            policy,
            oracle,
            near_pickup_oracle: None,
        }
    }

    pub fn with_near_pickup_oracle(mut self, oracle: &'a dyn TimeMatrixOracle) -> Self {
        self.near_pickup_oracle = Some(oracle);
        self
    }

    /// Clusters `orders`, then runs selection per cluster, returning the
    /// disjoint Jobs produced plus whatever stayed unbatched.
    pub async fn batch(&self, orders: Vec<Order>, now: u64) -> BatchResult {
        if orders.is_empty() {
            return BatchResult::default();
        }

        let clusters =
            clustering::cluster_orders(orders, self.policy, self.near_pickup_oracle).await;

        let mut result = BatchResult::default();
        for cluster in clusters {
            let (jobs, unbatched) =
                selection::select_jobs_for_cluster(cluster, self.policy, self.oracle, now).await;
            result.jobs.extend(jobs);
            result.unbatched_orders.extend(unbatched);
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispatch_core::coordinate::Coordinate;
    use geo::{CachingTimeMatrixOracle, EuclideanRouteFetcher};
    use std::collections::HashSet;
    use std::sync::Arc;

    fn order(plat: f64, plon: f64, dlat: f64, dlon: f64, created_at: u64) -> Order {
        Order::new_raw(
            uuid::Uuid::new_v4(),
            Coordinate::new(plat, plon),
            Coordinate::new(dlat, dlon),
            None,
            created_at,
            None,
        )
    }

    #[tokio::test]
    async fn empty_pool_yields_empty_result() {
        let policy = BatchingPolicy::default();
        let oracle = CachingTimeMatrixOracle::new(Arc::new(EuclideanRouteFetcher::new(40.0)));
        let engine = BatchingEngine::new(&policy, &oracle);

        let result = engine.batch(vec![], 0).await;
        assert!(result.jobs.is_empty());
        assert!(result.unbatched_orders.is_empty());
    }

    #[tokio::test]
    async fn every_input_order_is_accounted_for_exactly_once() {
        let policy = BatchingPolicy {
            enable_rolling_horizon: false,
            enable_continuous_chaining: true,
            ..BatchingPolicy::default()
        };
        let oracle = CachingTimeMatrixOracle::new(Arc::new(EuclideanRouteFetcher::new(40.0)));
        let engine = BatchingEngine::new(&policy, &oracle);

        let orders = vec![
            order(1.0, 1.0, 1.01, 1.01, 0),
            order(1.0002, 1.0002, 1.0102, 1.0102, 1),
            order(50.0, 50.0, 55.0, 55.0, 2),
        ];
        let input_ids: HashSet<_> = orders.iter().map(|o| o.id).collect();

        let result = engine.batch(orders, 100).await;

        let mut seen: HashSet<_> = result.unbatched_orders.iter().map(|o| o.id).collect();
        for job in &result.jobs {
            for id in &job.order_ids {
                assert!(seen.insert(*id), "order {id} appeared in more than one job");
            }
        }
        assert_eq!(seen, input_ids);
    }

    #[tokio::test]
    async fn jobs_from_one_call_have_disjoint_order_sets() {
        let policy = BatchingPolicy {
            enable_rolling_horizon: false,
            enable_continuous_chaining: true,
            pair_detour_cap: 1.0001,
            multi_detour_cap: 1.0001,
            ..BatchingPolicy::default()
        };
        let oracle = CachingTimeMatrixOracle::new(Arc::new(EuclideanRouteFetcher::new(40.0)));
        let engine = BatchingEngine::new(&policy, &oracle);

        let orders = vec![
            order(1.0, 1.0, 5.0, 5.0, 0),
            order(20.0, 20.0, 25.0, 25.0, 1),
        ];
        let result = engine.batch(orders, 100).await;

        for (i, a) in result.jobs.iter().enumerate() {
            for b in result.jobs.iter().skip(i + 1) {
                let a_ids: HashSet<_> = a.order_ids.iter().collect();
                let b_ids: HashSet<_> = b.order_ids.iter().collect();
                assert!(a_ids.is_disjoint(&b_ids));
            }
        }
    }
}
