use prometheus::core::Collector;
use prometheus::{
    Counter, CounterVec, Encoder, Gauge, HistogramOpts, HistogramVec, Opts, Registry,
    TextEncoder,
};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, PoisonError};

use super::error::MetricsError;

/// Central metrics registry for the service
///
/// Wraps a `prometheus::Registry` and tracks every fully-qualified metric
/// name it has accepted, so a second definition under the same name is
/// rejected before it can reach the underlying registry.
pub struct MetricsRegistry {
    registry: Registry,
    names: Mutex<BTreeSet<String>>,
    prefix: String,
}

impl MetricsRegistry {
    /// Build a registry with the default process metrics registered under
    /// `<prefix>_process_*`.
    pub fn new(prefix: &str) -> Result<Arc<Self>, MetricsError> {
        let metrics = Self::empty(prefix);
        metrics.register_process_metrics()?;
        Ok(Arc::new(metrics))
    }

    /// Build a registry without any default metrics
    pub fn empty(prefix: &str) -> Self {
        Self {
            registry: Registry::new(),
            names: Mutex::new(BTreeSet::new()),
            prefix: prefix.to_string(),
        }
    }

    #[cfg(target_os = "linux")]
    fn register_process_metrics(&self) -> Result<(), MetricsError> {
        use prometheus::process_collector::{pid_t, ProcessCollector};

        let collector = ProcessCollector::new(std::process::id() as pid_t, self.prefix.clone());
        self.register_boxed(Box::new(collector))
    }

    #[cfg(not(target_os = "linux"))]
    fn register_process_metrics(&self) -> Result<(), MetricsError> {
        tracing::debug!("Process metrics are not available on this platform");
        Ok(())
    }

    /// Register a collector under every name it describes.
    ///
    /// Fails with `DuplicateName` if any of those names is already taken; the
    /// registry is left untouched in that case.
    pub fn register<C>(&self, collector: C) -> Result<C, MetricsError>
    where
        C: Collector + Clone + 'static,
    {
        self.register_boxed(Box::new(collector.clone()))?;
        Ok(collector)
    }

    fn register_boxed(&self, collector: Box<dyn Collector>) -> Result<(), MetricsError> {
        let incoming: Vec<String> = collector
            .desc()
            .iter()
            .map(|desc| desc.fq_name.clone())
            .collect();

        let mut names = self.names.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(taken) = incoming.iter().find(|name| names.contains(*name)) {
            return Err(MetricsError::DuplicateName(taken.clone()));
        }

        self.registry.register(collector)?;
        names.extend(incoming);

        Ok(())
    }

    pub fn counter(&self, name: &str, help: &str) -> Result<Counter, MetricsError> {
        self.register(Counter::with_opts(Opts::new(name, help))?)
    }

    pub fn counter_vec(
        &self,
        name: &str,
        help: &str,
        labels: &[&str],
    ) -> Result<CounterVec, MetricsError> {
        self.register(CounterVec::new(Opts::new(name, help), labels)?)
    }

    pub fn gauge(&self, name: &str, help: &str) -> Result<Gauge, MetricsError> {
        self.register(Gauge::with_opts(Opts::new(name, help))?)
    }

    /// Histogram with fixed bucket bounds. Bounds must be non-empty and
    /// strictly increasing.
    pub fn histogram_vec(
        &self,
        name: &str,
        help: &str,
        labels: &[&str],
        buckets: &[f64],
    ) -> Result<HistogramVec, MetricsError> {
        validate_buckets(name, buckets)?;

        let opts = HistogramOpts::new(name, help).buckets(buckets.to_vec());
        self.register(HistogramVec::new(opts, labels)?)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(name)
    }

    /// Names of every registered metric, in sorted order
    pub fn names(&self) -> Vec<String> {
        self.names
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Export metrics in Prometheus text format
    pub fn export(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| MetricsError::Render(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| MetricsError::Render(e.to_string()))
    }

    /// Content type matching `export()` output
    pub fn content_type(&self) -> String {
        TextEncoder::new().format_type().to_string()
    }

    /// Get the underlying registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

fn validate_buckets(name: &str, buckets: &[f64]) -> Result<(), MetricsError> {
    if buckets.is_empty() {
        return Err(MetricsError::InvalidBuckets {
            name: name.to_string(),
            reason: "at least one bucket bound is required".to_string(),
        });
    }

    // A trailing +Inf is allowed; prometheus folds it into its own +Inf bucket
    let finite_until = match buckets.last() {
        Some(last) if *last == f64::INFINITY => buckets.len() - 1,
        _ => buckets.len(),
    };
    if finite_until == 0 {
        return Err(MetricsError::InvalidBuckets {
            name: name.to_string(),
            reason: "at least one finite bucket bound is required".to_string(),
        });
    }
    if let Some(bad) = buckets[..finite_until].iter().find(|b| !b.is_finite()) {
        return Err(MetricsError::InvalidBuckets {
            name: name.to_string(),
            reason: format!("bounds must be finite, got {}", bad),
        });
    }

    if let Some(pair) = buckets.windows(2).find(|pair| pair[0] >= pair[1]) {
        return Err(MetricsError::InvalidBuckets {
            name: name.to_string(),
            reason: format!("bounds must be strictly increasing, got {} then {}", pair[0], pair[1]),
        });
    }

    Ok(())
}
