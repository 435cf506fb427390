//! Clustering: groups the BATCHING pool into disjoint clusters
//! eligible to be considered together, before the combinatorial search
//! in `feasibility`/`selection` runs.

use std::collections::HashMap;

use dispatch_core::order::Order;
use dispatch_core::policy::BatchingPolicy;
use geo::TimeMatrixOracle;

/// Precision (decimal places) for the coordinate-bucket fallback key,
/// chosen for ~11 m precision.
const BUCKET_PRECISION: i32 = 4;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ClusterKey {
    Merchant(String),
    Bucket(i64, i64),
}

/// Groups `orders` into disjoint clusters per policy, truncating each to
/// `max_cluster_candidates` (oldest first) to bound downstream
/// combinatorics.
pub async fn cluster_orders(
    orders: Vec<Order>,
    policy: &BatchingPolicy,
    near_pickup_oracle: Option<&dyn TimeMatrixOracle>,
) -> Vec<Vec<Order>> {
    let mut clusters: Vec<Vec<Order>> = if policy.enable_continuous_chaining {
        vec![orders]
    } else {
        group_by_key(orders)
    };

    if !policy.enable_continuous_chaining {
        if let Some(oracle) = near_pickup_oracle {
            if policy.near_pickup_time_sec > 0 {
                clusters = merge_near_pickup_clusters(clusters, oracle, policy.near_pickup_time_sec)
                    .await;
            }
        }
    }

    for cluster in &mut clusters {
        truncate_oldest_first(cluster, policy.max_cluster_candidates);
    }

    clusters
}

fn group_by_key(orders: Vec<Order>) -> Vec<Vec<Order>> {
    let mut buckets: HashMap<ClusterKey, Vec<Order>> = HashMap::new();

    for order in orders {
        let key = match &order.merchant_id {
            Some(id) => ClusterKey::Merchant(id.clone()),
            None => {
                let (lat, lon) = order.pickup.bucket_key(BUCKET_PRECISION);
                ClusterKey::Bucket(lat, lon)
            }
        };
        buckets.entry(key).or_default().push(order);
    }

    buckets.into_values().collect()
}

/// Truncates to at most `max` orders, retaining the oldest
/// (creation-time ascending) first.
fn truncate_oldest_first(cluster: &mut Vec<Order>, max: usize) {
    cluster.sort_by_key(|o| o.created_at_secs);
    cluster.truncate(max);
}

struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            self.parent[x] = self.find(self.parent[x]);
        }
        self.parent[x]
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            self.parent[ra] = rb;
        }
    }
}

/// Unions clusters whose representative-pickup travel time is within
/// `near_pickup_time_sec` (the "near-pickup merge").
async fn merge_near_pickup_clusters(
    clusters: Vec<Vec<Order>>,
    oracle: &dyn TimeMatrixOracle,
    near_pickup_time_sec: u64,
) -> Vec<Vec<Order>> {
    if clusters.len() <= 1 {
        return clusters;
    }

    let representatives: Vec<_> = clusters
        .iter()
        .filter_map(|c| c.first().map(|o| o.pickup))
        .collect();

    if representatives.len() != clusters.len() {
        // Some cluster was empty; nothing sensible to merge.
        return clusters;
    }

    let matrix = oracle.durations(&representatives).await;
    let mut uf = UnionFind::new(clusters.len());

    for i in 0..clusters.len() {
        for j in (i + 1)..clusters.len() {
            if matrix[i][j] <= near_pickup_time_sec as f64 {
                uf.union(i, j);
            }
        }
    }

    let mut merged: HashMap<usize, Vec<Order>> = HashMap::new();
    for (i, cluster) in clusters.into_iter().enumerate() {
        let root = uf.find(i);
        merged.entry(root).or_default().extend(cluster);
    }

    merged.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispatch_core::coordinate::Coordinate;
    use dispatch_core::policy::BatchingPolicy;
    use geo::{CachingTimeMatrixOracle, EuclideanRouteFetcher};
    use std::sync::Arc;
    use uuid::Uuid;

    fn order(merchant: Option<&str>, lat: f64, lon: f64, created_at: u64) -> Order {
        Order::new_raw(
            Uuid::new_v4(),
            Coordinate::new(lat, lon),
            Coordinate::new(lat + 0.01, lon + 0.01),
            merchant.map(|s| s.to_string()),
            created_at,
            None,
        )
    }

    #[tokio::test]
    async fn groups_by_identical_merchant_id() {
        let policy = BatchingPolicy {
            enable_continuous_chaining: false,
            ..BatchingPolicy::default()
        };
        let orders = vec![
            order(Some("shop-a"), 1.0, 1.0, 0),
            order(Some("shop-a"), 2.0, 2.0, 1),
            order(Some("shop-b"), 3.0, 3.0, 2),
        ];

        let clusters = cluster_orders(orders, &policy, None).await;
        assert_eq!(clusters.len(), 2);
        assert!(clusters.iter().any(|c| c.len() == 2));
    }

    #[tokio::test]
    async fn continuous_chaining_yields_single_cluster() {
        let policy = BatchingPolicy {
            enable_continuous_chaining: true,
            ..BatchingPolicy::default()
        };
        let orders = vec![
            order(Some("shop-a"), 1.0, 1.0, 0),
            order(Some("shop-b"), 9.0, 9.0, 1),
        ];

        let clusters = cluster_orders(orders, &policy, None).await;
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), 2);
    }

    #[tokio::test]
    async fn truncation_keeps_oldest_orders() {
        let policy = BatchingPolicy {
            enable_continuous_chaining: false,
            max_cluster_candidates: 2,
            ..BatchingPolicy::default()
        };
        let orders = vec![
            order(Some("shop-a"), 1.0, 1.0, 5),
            order(Some("shop-a"), 1.0, 1.0, 1),
            order(Some("shop-a"), 1.0, 1.0, 3),
        ];

        let clusters = cluster_orders(orders, &policy, None).await;
        assert_eq!(clusters[0].len(), 2);
        assert_eq!(clusters[0][0].created_at_secs, 1);
        assert_eq!(clusters[0][1].created_at_secs, 3);
    }

    #[tokio::test]
    async fn near_pickup_merge_unions_close_clusters() {
        let policy = BatchingPolicy {
            enable_continuous_chaining: false,
            near_pickup_time_sec: 600,
            ..BatchingPolicy::default()
        };
        let oracle = CachingTimeMatrixOracle::new(Arc::new(EuclideanRouteFetcher::new(40.0)));
        let orders = vec![
            order(Some("shop-a"), 1.0, 1.0, 0),
            order(Some("shop-b"), 1.0005, 1.0005, 1),
        ];

        let clusters = cluster_orders(orders, &policy, Some(&oracle)).await;
        assert_eq!(clusters.len(), 1);
    }
}
