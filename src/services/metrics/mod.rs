pub mod collectors;
pub mod error;
pub mod middleware;
pub mod registry;
pub mod sampler;

pub use collectors::{BusinessMetricsCollector, HttpMetricsCollector};
pub use error::MetricsError;
pub use middleware::metrics_middleware;
pub use registry::MetricsRegistry;
pub use sampler::{GaugeSource, PeriodicSampler, SamplerHandle, SamplerState};
