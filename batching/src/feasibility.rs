//! Feasibility search: given a bundle of 1-3 orders (base case)
//! or an existing stop sequence plus one inserted order (insertion
//! case), finds the minimum-leg-time stop sequence that respects the
//! pickup-before-dropoff precedence invariant.

use dispatch_core::job::{Stop, StopType};
use dispatch_core::order::Order;
use geo::TimeMatrixOracle;

#[derive(Debug, Clone)]
pub struct FeasibilityResult {
    pub feasible: bool,
    pub best_sequence: Option<Vec<Stop>>,
    pub best_time_seconds: f64,
    pub sequences_explored: usize,
    pub reason: Option<String>,
}

impl FeasibilityResult {
    fn infeasible(reason: impl Into<String>) -> Self {
        Self {
            feasible: false,
            best_sequence: None,
            best_time_seconds: f64::INFINITY,
            sequences_explored: 0,
            reason: Some(reason.into()),
        }
    }
}

fn order_stops(order: &Order) -> (Stop, Stop) {
    (
        Stop {
            stop_type: StopType::Pickup,
            order_id: order.id,
            coordinate: order.pickup,
            pickup_location_id: order.merchant_id.clone(),
        },
        Stop {
            stop_type: StopType::Dropoff,
            order_id: order.id,
            coordinate: order.dropoff,
            pickup_location_id: None,
        },
    )
}

/// Every stop-index sequence of length `2*n` where, for each order `i`,
/// pickup (index `2*i`) precedes dropoff (index `2*i+1`) — generated
/// directly rather than permute-then-filter, since the two are
/// equivalent in the result set they produce.
fn enumerate_valid_index_sequences(n: usize) -> Vec<Vec<usize>> {
    let mut results = Vec::new();
    let mut current = Vec::with_capacity(2 * n);
    let mut pickup_placed = vec![false; n];
    let mut dropoff_placed = vec![false; n];

    fn backtrack(
        n: usize,
        current: &mut Vec<usize>,
        pickup_placed: &mut [bool],
        dropoff_placed: &mut [bool],
        results: &mut Vec<Vec<usize>>,
    ) {
        if current.len() == 2 * n {
            results.push(current.clone());
            return;
        }
        for i in 0..n {
            if !pickup_placed[i] {
                pickup_placed[i] = true;
                current.push(2 * i);
                backtrack(n, current, pickup_placed, dropoff_placed, results);
                current.pop();
                pickup_placed[i] = false;
            } else if !dropoff_placed[i] {
                dropoff_placed[i] = true;
                current.push(2 * i + 1);
                backtrack(n, current, pickup_placed, dropoff_placed, results);
                current.pop();
                dropoff_placed[i] = false;
            }
        }
    }

    backtrack(
        n,
        &mut current,
        &mut pickup_placed,
        &mut dropoff_placed,
        &mut results,
    );
    results
}

fn sequence_time(seq: &[usize], matrix: &[Vec<f64>]) -> f64 {
    seq.windows(2).map(|w| matrix[w[0]][w[1]]).sum()
}

/// Base case: a bundle of 1-3 orders, all permutations
/// enumerated, minimum-time valid sequence returned.
pub async fn solve_base_case(
    orders: &[Order],
    oracle: &dyn TimeMatrixOracle,
) -> FeasibilityResult {
    if orders.is_empty() {
        return FeasibilityResult::infeasible("empty bundle");
    }

    let stops: Vec<Stop> = orders
        .iter()
        .flat_map(|o| {
            let (p, d) = order_stops(o);
            [p, d]
        })
        .collect();

    let coords: Vec<_> = stops.iter().map(|s| s.coordinate).collect();
    let matrix = oracle.durations(&coords).await;

    let candidates = enumerate_valid_index_sequences(orders.len());
    let mut best_time = f64::INFINITY;
    let mut best_seq: Option<Vec<usize>> = None;

    for seq in &candidates {
        let time = sequence_time(seq, &matrix);
        if time < best_time {
            best_time = time;
            best_seq = Some(seq.clone());
        }
    }

    match best_seq {
        Some(seq) if best_time.is_finite() => FeasibilityResult {
            feasible: true,
            best_sequence: Some(seq.iter().map(|&i| stops[i].clone()).collect()),
            best_time_seconds: best_time,
            sequences_explored: candidates.len(),
            reason: None,
        },
        _ => FeasibilityResult {
            feasible: false,
            best_sequence: None,
            best_time_seconds: f64::INFINITY,
            sequences_explored: candidates.len(),
            reason: Some("oracle returned no finite route for any permutation".to_string()),
        },
    }
}

/// Insertion case: `i` and `j` are insertion *gaps* in
/// `existing` (0..=m, m+1 of them) with `i <= j`; the pickup goes into
/// gap `i` and the dropoff into gap `j`, so `i == j` places the new
/// order's two stops back to back with nothing existing between them.
/// Guarded by `max_candidate_pairs` to bound work on long sequences.
pub async fn solve_insertion(
    existing: &[Stop],
    candidate: &Order,
    oracle: &dyn TimeMatrixOracle,
    max_candidate_pairs: usize,
) -> FeasibilityResult {
    let (new_pickup, new_dropoff) = order_stops(candidate);

    let mut coords: Vec<_> = existing.iter().map(|s| s.coordinate).collect();
    let pickup_idx = coords.len();
    coords.push(new_pickup.coordinate);
    let dropoff_idx = coords.len();
    coords.push(new_dropoff.coordinate);

    let matrix = oracle.durations(&coords).await;

    let m = existing.len();
    let mut best_time = f64::INFINITY;
    let mut best_positions: Option<(usize, usize)> = None;
    let mut explored = 0usize;

    'outer: for i in 0..=m {
        for j in i..=m {
            if explored >= max_candidate_pairs {
                break 'outer;
            }
            explored += 1;

            let mut idx_seq: Vec<usize> = (0..i).collect();
            idx_seq.push(pickup_idx);
            idx_seq.extend(i..j);
            idx_seq.push(dropoff_idx);
            idx_seq.extend(j..m);

            let time = sequence_time(&idx_seq, &matrix);
            if time < best_time {
                best_time = time;
                best_positions = Some((i, j));
            }
        }
    }

    match best_positions {
        Some((i, j)) if best_time.is_finite() => {
            let mut seq = existing.to_vec();
            seq.insert(i, new_pickup);
            seq.insert(j + 1, new_dropoff);
            FeasibilityResult {
                feasible: true,
                best_sequence: Some(seq),
                best_time_seconds: best_time,
                sequences_explored: explored,
                reason: None,
            }
        }
        _ => FeasibilityResult {
            feasible: false,
            best_sequence: None,
            best_time_seconds: f64::INFINITY,
            sequences_explored: explored,
            reason: Some("no insertion position reachable by the oracle".to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispatch_core::coordinate::Coordinate;
    use geo::{CachingTimeMatrixOracle, EuclideanRouteFetcher};
    use std::sync::Arc;
    use uuid::Uuid;

    fn order(plat: f64, plon: f64, dlat: f64, dlon: f64) -> Order {
        Order::new_raw(
            Uuid::new_v4(),
            Coordinate::new(plat, plon),
            Coordinate::new(dlat, dlon),
            None,
            0,
            None,
        )
    }

    #[tokio::test]
    async fn single_order_base_case_is_trivially_feasible() {
        let oracle = CachingTimeMatrixOracle::new(Arc::new(EuclideanRouteFetcher::new(40.0)));
        let o = order(1.0, 1.0, 1.01, 1.01);

        let result = solve_base_case(&[o], &oracle).await;
        assert!(result.feasible);
        assert_eq!(result.sequences_explored, 1);
        let seq = result.best_sequence.unwrap();
        assert_eq!(seq[0].stop_type, StopType::Pickup);
        assert_eq!(seq[1].stop_type, StopType::Dropoff);
    }

    #[tokio::test]
    async fn pair_base_case_respects_precedence_for_both_orders() {
        let oracle = CachingTimeMatrixOracle::new(Arc::new(EuclideanRouteFetcher::new(40.0)));
        let a = order(1.0, 1.0, 1.02, 1.02);
        let b = order(1.001, 1.001, 1.021, 1.021);

        let result = solve_base_case(&[a.clone(), b.clone()], &oracle).await;
        assert!(result.feasible);
        let seq = result.best_sequence.unwrap();

        for order_id in [a.id, b.id] {
            let p = seq
                .iter()
                .position(|s| s.order_id == order_id && s.stop_type == StopType::Pickup)
                .unwrap();
            let d = seq
                .iter()
                .position(|s| s.order_id == order_id && s.stop_type == StopType::Dropoff)
                .unwrap();
            assert!(p < d);
        }
    }

    #[tokio::test]
    async fn insertion_case_preserves_existing_order_relative_sequence() {
        let oracle = CachingTimeMatrixOracle::new(Arc::new(EuclideanRouteFetcher::new(40.0)));
        let seed = order(0.0, 0.0, 0.01, 0.0);
        let (p, d) = order_stops(&seed);
        let existing = vec![p, d];

        let candidate = order(0.005, 0.0, 0.006, 0.0);
        let result = solve_insertion(&existing, &candidate, &oracle, 300).await;

        assert!(result.feasible);
        let seq = result.best_sequence.unwrap();
        let seed_p = seq
            .iter()
            .position(|s| s.order_id == seed.id && s.stop_type == StopType::Pickup)
            .unwrap();
        let seed_d = seq
            .iter()
            .position(|s| s.order_id == seed.id && s.stop_type == StopType::Dropoff)
            .unwrap();
        assert!(seed_p < seed_d);
    }

    #[tokio::test]
    async fn empty_bundle_is_infeasible() {
        let oracle = CachingTimeMatrixOracle::new(Arc::new(EuclideanRouteFetcher::new(40.0)));
        let result = solve_base_case(&[], &oracle).await;
        assert!(!result.feasible);
        assert!(result.reason.is_some());
    }
}
