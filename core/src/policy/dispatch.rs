/// Configuration for wave construction and broadcast timing.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchPolicy {
    pub wave_timeout_seconds: u64,
    /// Exactly 5 strictly increasing thresholds, in decimal degrees.
    pub wave_radii_degrees: [f64; 5],
    /// Exactly 5 strictly increasing thresholds, in seconds.
    pub wave_eta_seconds: [u64; 5],
    pub default_required_capacity: u32,
}

impl Default for DispatchPolicy {
    fn default() -> Self {
        Self {
            wave_timeout_seconds: 30,
            wave_radii_degrees: [0.02, 0.04, 0.06, 0.08, 0.10],
            wave_eta_seconds: [180, 420, 600, 780, 960],
            default_required_capacity: 1,
        }
    }
}

impl DispatchPolicy {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.wave_timeout_seconds == 0 {
            anyhow::bail!("wave_timeout_seconds must be > 0");
        }
        if !is_strictly_increasing(&self.wave_radii_degrees) {
            anyhow::bail!("wave_radii_degrees must be strictly increasing");
        }
        if !is_strictly_increasing_u64(&self.wave_eta_seconds) {
            anyhow::bail!("wave_eta_seconds must be strictly increasing");
        }
        if self.default_required_capacity == 0 {
            anyhow::bail!("default_required_capacity must be >= 1");
        }
        Ok(())
    }
}

fn is_strictly_increasing(values: &[f64; 5]) -> bool {
    values.windows(2).all(|w| w[0] < w[1])
}

fn is_strictly_increasing_u64(values: &[u64; 5]) -> bool {
    values.windows(2).all(|w| w[0] < w[1])
}

pub fn default_driver_policy() -> anyhow::Result<DispatchPolicy> {
    let p = DispatchPolicy::default();
    p.validate()?;
    Ok(p)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_validates() {
        assert!(default_driver_policy().is_ok());
    }

    #[test]
    fn rejects_non_increasing_radii() {
        let mut p = DispatchPolicy::default();
        p.wave_radii_degrees = [0.02, 0.04, 0.04, 0.08, 0.10];
        assert!(p.validate().is_err());
    }

    #[test]
    fn rejects_zero_timeout() {
        let p = DispatchPolicy {
            wave_timeout_seconds: 0,
            ..DispatchPolicy::default()
        };
        assert!(p.validate().is_err());
    }
}
