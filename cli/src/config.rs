//! Deployment-level tunables, distinct from `BatchingPolicy`/`DispatchPolicy`:
//! tick cadence, channel sizing, logging mode. These are
//! process-environment-sourced, unlike the policy bundles, which stay plain
//! constructible structs passed explicitly by the caller.

#[derive(Clone, Debug)]
pub struct DispatchConfig {
    /// Milliseconds between batching/dispatch ticks in the simulation loop.
    pub tick_interval_ms: u64,

    /// Capacity of the channel carrying ready Jobs from the batching tick
    /// to the wave-dispatch stage.
    pub job_channel_capacity: usize,

    /// Upper bound on distinct coordinates the `CachingTimeMatrixOracle`
    /// will hold before a caller should consider recycling it.
    pub oracle_cache_bound: usize,

    /// `true` for structured JSON log lines, `false` for human-readable.
    pub log_json: bool,
}

impl DispatchConfig {
    pub fn from_env() -> Self {
        let tick_interval_ms = std::env::var("DISPATCH_TICK_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(2_000);

        let job_channel_capacity = std::env::var("DISPATCH_JOB_CHANNEL_CAPACITY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(256);

        let oracle_cache_bound = std::env::var("DISPATCH_ORACLE_CACHE_BOUND")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10_000);

        let log_json = std::env::var("DISPATCH_LOG_JSON")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Self {
            tick_interval_ms,
            job_channel_capacity,
            oracle_cache_bound,
            log_json,
        }
    }
}
