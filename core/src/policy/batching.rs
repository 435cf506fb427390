/// Central configuration for order batching.
///
/// Keep all batching thresholds here so behavior can be tuned without
/// touching clustering/feasibility/scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchingPolicy {
    pub max_batch_size: usize,
    pub max_cluster_candidates: usize,
    pub max_candidate_pairs: usize,

    /// If pickup_id matches, orders are always in the same cluster; if it
    /// differs, treat as "near pickup" only if oracle travel time between
    /// pickups is within this threshold.
    pub near_pickup_time_sec: u64,

    pub enable_continuous_chaining: bool,
    pub chaining_radius_sec: u64,

    /// Pair bundle must not exceed this multiple of sum of individual trips.
    pub pair_detour_cap: f64,
    /// Bundle of size >= 3 must not exceed this multiple.
    pub multi_detour_cap: f64,

    pub batching_soft_wait_sec: u64,
    pub batching_hard_wait_sec: u64,

    pub enable_rolling_horizon: bool,
    pub max_wait_time_seconds: u64,

    pub prefer_older_orders: bool,
    pub age_weight: f64,
}

impl Default for BatchingPolicy {
    fn default() -> Self {
        Self {
            max_batch_size: 10,
            max_cluster_candidates: 20,
            max_candidate_pairs: 300,
            near_pickup_time_sec: 180,
            enable_continuous_chaining: true,
            chaining_radius_sec: 400,
            pair_detour_cap: 1.15,
            multi_detour_cap: 1.25,
            batching_soft_wait_sec: 180,
            batching_hard_wait_sec: 600,
            enable_rolling_horizon: true,
            max_wait_time_seconds: 180,
            prefer_older_orders: true,
            age_weight: 0.05,
        }
    }
}

impl BatchingPolicy {
    /// Basic sanity checks. Call once at startup.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_batch_size < 1 {
            anyhow::bail!("max_batch_size must be >= 1");
        }
        if self.pair_detour_cap < 1.0 {
            anyhow::bail!("pair_detour_cap must be >= 1.0");
        }
        if self.multi_detour_cap < 1.0 {
            anyhow::bail!("multi_detour_cap must be >= 1.0");
        }
        if self.near_pickup_time_sec == 0 {
            anyhow::bail!("near_pickup_time_sec must be > 0");
        }
        if self.max_cluster_candidates == 0 {
            anyhow::bail!("max_cluster_candidates must be > 0");
        }
        if self.max_candidate_pairs == 0 {
            anyhow::bail!("max_candidate_pairs must be > 0");
        }
        if self.batching_hard_wait_sec < self.batching_soft_wait_sec {
            anyhow::bail!("batching_hard_wait_sec must be >= batching_soft_wait_sec");
        }
        Ok(())
    }
}

/// Convenience factory mirroring the default policy.
pub fn default_policy() -> anyhow::Result<BatchingPolicy> {
    let p = BatchingPolicy::default();
    p.validate()?;
    Ok(p)
}

/// More aggressive batching during peak hours.
pub fn peak_policy() -> anyhow::Result<BatchingPolicy> {
    let p = BatchingPolicy {
        near_pickup_time_sec: 240,
        chaining_radius_sec: 500,
        pair_detour_cap: 1.18,
        multi_detour_cap: 1.35,
        batching_soft_wait_sec: 120,
        batching_hard_wait_sec: 540,
        age_weight: 0.08,
        ..BatchingPolicy::default()
    };
    p.validate()?;
    Ok(p)
}

/// Less aggressive batching during off-peak hours, to protect ETAs.
pub fn offpeak_policy() -> anyhow::Result<BatchingPolicy> {
    let p = BatchingPolicy {
        near_pickup_time_sec: 150,
        enable_continuous_chaining: false,
        chaining_radius_sec: 180,
        pair_detour_cap: 1.10,
        multi_detour_cap: 1.18,
        batching_soft_wait_sec: 90,
        batching_hard_wait_sec: 420,
        age_weight: 0.03,
        ..BatchingPolicy::default()
    };
    p.validate()?;
    Ok(p)
}
