use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::Range;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::services::metrics::sampler::GaugeSource;

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Probability in [0, 1] that a simulated call fails
    pub error_rate: f64,
    pub items_max_latency_ms: u64,
    pub action_max_latency_ms: u64,
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            error_rate: 0.05,
            items_max_latency_ms: 200,
            action_max_latency_ms: 300,
            seed: None,
        }
    }
}

/// Shared source of demo randomness: latency, failures, prices and amounts.
///
/// Seeding makes every draw reproducible, which is what the tests rely on.
pub struct Simulation {
    rng: Mutex<StdRng>,
    config: SimulationConfig,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Self {
            rng: Mutex::new(rng),
            config,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut rng)
    }

    /// Uniform delay in [0, max_ms) milliseconds
    pub fn latency(&self, max_ms: u64) -> Duration {
        if max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(self.with_rng(|rng| rng.random_range(0..max_ms)))
    }

    pub fn should_fail(&self) -> bool {
        let rate = self.config.error_rate;
        let rate = if rate.is_nan() { 0.0 } else { rate.clamp(0.0, 1.0) };
        self.with_rng(|rng| rng.random_bool(rate))
    }

    /// Uniform integer in `range`
    pub fn between(&self, range: Range<u32>) -> u32 {
        if range.is_empty() {
            return range.start;
        }
        self.with_rng(|rng| rng.random_range(range))
    }
}

/// Synthetic active-user count in [20, 70)
pub struct ActiveUsersSource {
    simulation: Arc<Simulation>,
}

impl ActiveUsersSource {
    pub fn new(simulation: Arc<Simulation>) -> Self {
        Self { simulation }
    }
}

#[async_trait]
impl GaugeSource for ActiveUsersSource {
    async fn sample(&self) -> Result<f64, String> {
        Ok(self.simulation.between(20..70) as f64)
    }
}
