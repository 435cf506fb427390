//! A closed-form `RouteFetcher` for tests and simulation, when no real
//! routing backend is wired in. Degree distance against an assumed
//! average speed — the same fallback metric used for wave bucketing
//! when no oracle is injected there.

use async_trait::async_trait;

use dispatch_core::Coordinate;

use crate::oracle::RouteFetcher;

const DEGREES_TO_METERS: f64 = 111_320.0;

/// Converts planar degree-distance into seconds at a configured average
/// speed (km/h). Never returns infinity or a negative value: this
/// fetcher is meant to always succeed, unlike a real network backend
/// which may leave a pair unroutable.
pub struct EuclideanRouteFetcher {
    speed_kmh: f64,
}

impl EuclideanRouteFetcher {
    pub fn new(speed_kmh: f64) -> Self {
        Self { speed_kmh }
    }
}

#[async_trait]
impl RouteFetcher for EuclideanRouteFetcher {
    async fn fetch_square(&self, coords: &[Coordinate]) -> Vec<Vec<f64>> {
        let speed_mps = (self.speed_kmh * 1000.0) / 3600.0;

        coords
            .iter()
            .map(|a| {
                coords
                    .iter()
                    .map(|b| {
                        let meters = a.degree_distance(b) * DEGREES_TO_METERS;
                        meters / speed_mps
                    })
                    .collect()
            })
            .collect()
    }
}
