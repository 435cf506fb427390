/// A point in decimal-degree latitude/longitude.
///
/// Equality and hashing are bit-exact on the underlying `f64`s, which is
/// fine here: coordinates are always read verbatim from an Order/Driver
/// record, never computed, so two equal coordinates always came from the
/// same source reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Rounds to ~11 m precision (4 decimal places), used by the
    /// clustering fallback bucket key when a pickup-location id is absent.
    pub fn bucket_key(&self, precision: i32) -> (i64, i64) {
        let scale = 10f64.powi(precision);
        (
            (self.lat * scale).round() as i64,
            (self.lon * scale).round() as i64,
        )
    }

    /// Planar (non-geodesic) degree distance, used by the Euclidean
    /// fallback time matrix and the wave-construction distance fallback.
    pub fn degree_distance(&self, other: &Coordinate) -> f64 {
        let dlat = self.lat - other.lat;
        let dlon = self.lon - other.lon;
        (dlat * dlat + dlon * dlon).sqrt()
    }
}

impl Eq for Coordinate {}

impl std::hash::Hash for Coordinate {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.lat.to_bits().hash(state);
        self.lon.to_bits().hash(state);
    }
}
