//! The oracle contract and its caching decorator.
//!
//! `TimeMatrixOracle` is the contract the rest of the core depends on.
//! `CachingTimeMatrixOracle` is the only implementation: it wraps a
//! pluggable `RouteFetcher` (the actual routing backend — an HTTP
//! isochrone service, a precomputed table, or the Euclidean fallback in
//! `fallback`).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use dispatch_core::Coordinate;

/// A single coordinate's bit-exact cache key (see `Coordinate`'s own
/// `Eq`/`Hash` impl for why bit-exact identity is the right key here).
type CoordKey = (u64, u64);

fn key_of(c: &Coordinate) -> CoordKey {
    (c.lat.to_bits(), c.lon.to_bits())
}

/// The routing backend a `CachingTimeMatrixOracle` delegates to on a
/// cache miss. Implementations may call out to an HTTP routing service,
/// a precomputed lookup table, or (in tests / simulation) a closed-form
/// distance model.
///
/// `fetch_square` must never return a negative duration; an unroutable
/// pair is signaled with `f64::INFINITY`, never an `Err`, since the
/// oracle itself never fails — only individual cells do.
#[async_trait]
pub trait RouteFetcher: Send + Sync {
    async fn fetch_square(&self, coords: &[Coordinate]) -> Vec<Vec<f64>>;
}

/// Bulk travel-time lookups with a process-local cache.
///
/// `durations` is idempotent and commutative: the returned matrix
/// depends only on the coordinates supplied, never on call ordering or
/// on what has previously been cached. `prefetch` exists purely as a
/// warm-up hint; it changes performance, never the answer returned by a
/// subsequent `durations` call.
#[async_trait]
pub trait TimeMatrixOracle: Send + Sync {
    async fn durations(&self, coords: &[Coordinate]) -> Vec<Vec<f64>>;

    async fn prefetch(&self, coords: &[Coordinate]);
}

/// Caches pairwise travel times keyed by `(CoordKey, CoordKey)`. A query
/// containing any coordinate never seen before triggers a fetch of the
/// full square for the *whole* query (not just the unseen coordinates),
/// which is then merged into the cache — keeping the fetcher interface
/// simple (always square, never a partial matrix).
pub struct CachingTimeMatrixOracle<F: RouteFetcher> {
    fetcher: Arc<F>,
    cache: Mutex<HashMap<(CoordKey, CoordKey), f64>>,
    seen: Mutex<std::collections::HashSet<CoordKey>>,
}

impl<F: RouteFetcher> CachingTimeMatrixOracle<F> {
    pub fn new(fetcher: Arc<F>) -> Self {
        Self {
            fetcher,
            cache: Mutex::new(HashMap::new()),
            seen: Mutex::new(std::collections::HashSet::new()),
        }
    }

    async fn fetch_and_merge(&self, coords: &[Coordinate]) {
        let square = self.fetcher.fetch_square(coords).await;

        let mut cache = self.cache.lock().await;
        let mut seen = self.seen.lock().await;

        for (i, a) in coords.iter().enumerate() {
            for (j, b) in coords.iter().enumerate() {
                let duration = square
                    .get(i)
                    .and_then(|row| row.get(j))
                    .copied()
                    .unwrap_or(f64::INFINITY);
                cache.insert((key_of(a), key_of(b)), duration.max(0.0));
            }
            seen.insert(key_of(a));
        }
    }

    async fn has_unseen(&self, coords: &[Coordinate]) -> bool {
        let seen = self.seen.lock().await;
        coords.iter().any(|c| !seen.contains(&key_of(c)))
    }
}

#[async_trait]
impl<F: RouteFetcher> TimeMatrixOracle for CachingTimeMatrixOracle<F> {
    async fn durations(&self, coords: &[Coordinate]) -> Vec<Vec<f64>> {
        if coords.is_empty() {
            return Vec::new();
        }

        if self.has_unseen(coords).await {
            self.fetch_and_merge(coords).await;
        }

        let cache = self.cache.lock().await;
        coords
            .iter()
            .map(|a| {
                coords
                    .iter()
                    .map(|b| {
                        cache
                            .get(&(key_of(a), key_of(b)))
                            .copied()
                            .unwrap_or(f64::INFINITY)
                    })
                    .collect()
            })
            .collect()
    }

    async fn prefetch(&self, coords: &[Coordinate]) {
        if coords.is_empty() {
            return;
        }
        if self.has_unseen(coords).await {
            self.fetch_and_merge(coords).await;
        }
    }
}
