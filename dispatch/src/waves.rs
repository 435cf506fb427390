//! Wave construction: eligibility filter, five-ring bucketing by
//! distance or oracle ETA, ascending sort, top-5 cap per wave.

use dispatch_core::coordinate::Coordinate;
use dispatch_core::driver::Driver;
use dispatch_core::policy::DispatchPolicy;
use geo::TimeMatrixOracle;

const WAVE_COUNT: usize = 5;
const MAX_DRIVERS_PER_WAVE: usize = 5;

/// Buckets `drivers` into five ordered waves around `pickup`. Drivers
/// beyond the fifth threshold are excluded entirely. Uses the oracle's
/// travel-time metric when supplied, falling back to Euclidean
/// degree-distance otherwise.
pub async fn build_waves(
    pickup: Coordinate,
    drivers: &[Driver],
    required_capacity: u32,
    policy: &DispatchPolicy,
    oracle: Option<&dyn TimeMatrixOracle>,
) -> [Vec<Driver>; WAVE_COUNT] {
    let eligible: Vec<Driver> = drivers
        .iter()
        .filter(|d| d.is_eligible(required_capacity))
        .cloned()
        .collect();

    let metrics: Vec<f64> = match oracle {
        Some(oracle) => {
            let mut coords = vec![pickup];
            coords.extend(eligible.iter().map(|d| d.location));
            let matrix = oracle.durations(&coords).await;
            (0..eligible.len()).map(|i| matrix[0][i + 1]).collect()
        }
        None => eligible
            .iter()
            .map(|d| pickup.degree_distance(&d.location))
            .collect(),
    };

    let thresholds: [f64; WAVE_COUNT] = match oracle {
        Some(_) => policy.wave_eta_seconds.map(|s| s as f64),
        None => policy.wave_radii_degrees,
    };

    let mut buckets: [Vec<(Driver, f64)>; WAVE_COUNT] = Default::default();

    for (driver, metric) in eligible.into_iter().zip(metrics) {
        if let Some(wave_idx) = thresholds.iter().position(|&t| metric <= t) {
            buckets[wave_idx].push((driver, metric));
        }
    }

    buckets.map(|mut bucket| {
        bucket.sort_by(|a, b| a.1.total_cmp(&b.1));
        bucket.truncate(MAX_DRIVERS_PER_WAVE);
        bucket.into_iter().map(|(d, _)| d).collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispatch_core::driver::DriverStatus;
    use geo::{CachingTimeMatrixOracle, EuclideanRouteFetcher};
    use std::sync::Arc;

    fn driver(id: &str, lat: f64, lon: f64, status: DriverStatus, capacity: u32) -> Driver {
        Driver::new(id, Coordinate::new(lat, lon), status).with_capacity(capacity)
    }

    #[tokio::test]
    async fn all_offline_drivers_yield_five_empty_waves() {
        let policy = DispatchPolicy::default();
        let pickup = Coordinate::new(0.0, 0.0);
        let drivers = vec![
            driver("a", 0.001, 0.0, DriverStatus::Offline, 1),
            driver("b", 0.002, 0.0, DriverStatus::Paused, 1),
        ];

        let waves = build_waves(pickup, &drivers, 1, &policy, None).await;
        assert!(waves.iter().all(|w| w.is_empty()));
    }

    #[tokio::test]
    async fn driver_at_boundary_distance_lands_in_expected_wave_not_the_next() {
        let mut policy = DispatchPolicy::default();
        policy.wave_radii_degrees = [0.01, 0.02, 0.03, 0.04, 0.05];
        let pickup = Coordinate::new(0.0, 0.0);
        let drivers = vec![driver("a", 0.01, 0.0, DriverStatus::Available, 1)];

        let waves = build_waves(pickup, &drivers, 1, &policy, None).await;
        assert_eq!(waves[0].len(), 1);
        assert!(waves[1].is_empty());
    }

    #[tokio::test]
    async fn beyond_fifth_threshold_excluded_from_all_waves() {
        let mut policy = DispatchPolicy::default();
        policy.wave_radii_degrees = [0.01, 0.02, 0.03, 0.04, 0.05];
        let pickup = Coordinate::new(0.0, 0.0);
        let drivers = vec![driver("a", 1.0, 0.0, DriverStatus::Available, 1)];

        let waves = build_waves(pickup, &drivers, 1, &policy, None).await;
        assert!(waves.iter().all(|w| w.is_empty()));
    }

    #[tokio::test]
    async fn wave_caps_at_five_nearest_drivers() {
        let mut policy = DispatchPolicy::default();
        policy.wave_radii_degrees = [1.0, 2.0, 3.0, 4.0, 5.0];
        let pickup = Coordinate::new(0.0, 0.0);
        let drivers: Vec<_> = (0..8)
            .map(|i| driver(&format!("d{i}"), 0.001 * i as f64, 0.0, DriverStatus::Available, 1))
            .collect();

        let waves = build_waves(pickup, &drivers, 1, &policy, None).await;
        assert_eq!(waves[0].len(), 5);
        assert_eq!(waves[0][0].id, "d0");
    }

    #[tokio::test]
    async fn insufficient_capacity_drivers_are_excluded() {
        let policy = DispatchPolicy::default();
        let pickup = Coordinate::new(0.0, 0.0);
        let drivers = vec![driver("a", 0.001, 0.0, DriverStatus::Available, 1)];

        let waves = build_waves(pickup, &drivers, 2, &policy, None).await;
        assert!(waves.iter().all(|w| w.is_empty()));
    }

    #[tokio::test]
    async fn oracle_eta_metric_is_used_when_supplied() {
        let mut policy = DispatchPolicy::default();
        policy.wave_eta_seconds = [60, 120, 180, 240, 300];
        let pickup = Coordinate::new(0.0, 0.0);
        let drivers = vec![driver("a", 0.001, 0.0, DriverStatus::Available, 1)];
        let oracle = CachingTimeMatrixOracle::new(Arc::new(EuclideanRouteFetcher::new(3600.0)));

        let waves = build_waves(pickup, &drivers, 1, &policy, Some(&oracle)).await;
        assert_eq!(waves[0].len(), 1);
    }
}
