use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::services::simulation::SimulationConfig;

/// Business hooks active for this service instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceRole {
    /// Counts orders and revenue on `POST /api/action`
    Order,
    /// Runs the active-users sampler
    User,
    Generic,
}

impl ServiceRole {
    pub fn from_service_name(name: &str) -> Self {
        match name {
            "order-service" => Self::Order,
            "user-service" => Self::User,
            _ => Self::Generic,
        }
    }
}

impl FromStr for ServiceRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "order" => Ok(Self::Order),
            "user" => Ok(Self::User),
            "generic" => Ok(Self::Generic),
            other => Err(format!("Unknown service role: {}", other)),
        }
    }
}

/// Environment configuration
/// Loads and validates environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub service_name: String,
    pub port: u16,
    pub role: ServiceRole,
    pub db_host: Option<String>,
    pub redis_host: Option<String>,
    /// Skip `/health` and `/metrics` in request metrics
    pub exclude_probes: bool,
    pub sampler_interval: Duration,
    pub simulation: SimulationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "unknown-service".to_string(),
            port: 8000,
            role: ServiceRole::Generic,
            db_host: None,
            redis_host: None,
            exclude_probes: true,
            sampler_interval: Duration::from_secs(5),
            simulation: SimulationConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let mut config = Self::default();

        if let Ok(name) = env::var("SERVICE_NAME") {
            if name.trim().is_empty() {
                return Err("SERVICE_NAME must not be empty".to_string());
            }
            config.service_name = name;
        }

        config.role = match env::var("SERVICE_ROLE") {
            Ok(role) => role.parse()?,
            Err(_) => ServiceRole::from_service_name(&config.service_name),
        };

        if let Some(port) = parse_var("SERVICE_PORT")? {
            config.port = port;
        }

        config.db_host = env::var("DB_HOST").ok().filter(|v| !v.is_empty());
        config.redis_host = env::var("REDIS_HOST").ok().filter(|v| !v.is_empty());

        if let Some(exclude) = parse_var("METRICS_EXCLUDE_PROBES")? {
            config.exclude_probes = exclude;
        }

        if let Some(secs) = parse_var::<u64>("SAMPLER_INTERVAL_SECS")? {
            if secs == 0 {
                return Err("SAMPLER_INTERVAL_SECS must be greater than 0".to_string());
            }
            config.sampler_interval = Duration::from_secs(secs);
        }

        if let Some(rate) = parse_var::<f64>("SIMULATED_ERROR_RATE")? {
            if !(0.0..=1.0).contains(&rate) {
                return Err(format!("SIMULATED_ERROR_RATE must be within [0, 1], got {}", rate));
            }
            config.simulation.error_rate = rate;
        }

        if let Some(ms) = parse_var("SIMULATED_ITEMS_LATENCY_MS")? {
            config.simulation.items_max_latency_ms = ms;
        }

        if let Some(ms) = parse_var("SIMULATED_ACTION_LATENCY_MS")? {
            config.simulation.action_max_latency_ms = ms;
        }

        config.simulation.seed = parse_var("SIMULATION_SEED")?;

        Ok(config)
    }

    /// Service name as a metric-name prefix (`order-service` -> `order_service`)
    pub fn metric_prefix(&self) -> String {
        self.service_name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect()
    }
}

fn parse_var<T>(key: &str) -> Result<Option<T>, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(val) => val
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| format!("Invalid {}: {}", key, e)),
        Err(_) => Ok(None),
    }
}
