use rand::{rngs::StdRng, SeedableRng};
use std::time::Duration;

use printwatch_common::{env_opt, env_or};

#[derive(Clone, Debug)]
pub struct SimulationConfig {
    pub seed: Option<u64>,
    pub status_online_ratio: f64,
    pub details_online_ratio: f64,
    pub delay_min: Duration,
    pub delay_max: Duration,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            status_online_ratio: 0.7,
            details_online_ratio: 0.9,
            delay_min: Duration::from_millis(100),
            delay_max: Duration::from_millis(500),
        }
    }
}

impl SimulationConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let status_online_ratio = env_or("STATUS_ONLINE_RATIO", defaults.status_online_ratio);
        let details_online_ratio = env_or("DETAILS_ONLINE_RATIO", defaults.details_online_ratio);
        let delay_min = env_or("SIM_DELAY_MIN_MS", defaults.delay_min.as_millis() as u64);
        let delay_max = env_or("SIM_DELAY_MAX_MS", defaults.delay_max.as_millis() as u64);

        Self {
            seed: env_opt("SIM_SEED"),
            status_online_ratio: clamp_ratio(status_online_ratio),
            details_online_ratio: clamp_ratio(details_online_ratio),
            delay_min: Duration::from_millis(delay_min),
            delay_max: Duration::from_millis(delay_max.max(delay_min)),
        }
    }

    /// Random source for the printer at `index` in a request.
    pub fn rng_for(&self, index: usize) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(index as u64)),
            None => StdRng::from_entropy(),
        }
    }
}

fn clamp_ratio(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn ratios_are_clamped() {
        assert_eq!(clamp_ratio(1.5), 1.0);
        assert_eq!(clamp_ratio(-0.2), 0.0);
        assert_eq!(clamp_ratio(f64::NAN), 0.0);
        assert_eq!(clamp_ratio(0.3), 0.3);
    }

    #[test]
    fn seeded_rng_is_repeatable_per_index() {
        let config = SimulationConfig {
            seed: Some(99),
            ..SimulationConfig::default()
        };
        let a: u64 = config.rng_for(2).gen();
        let b: u64 = config.rng_for(2).gen();
        let c: u64 = config.rng_for(3).gen();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
