use prometheus::core::Collector;
use prometheus::proto::{Metric, MetricFamily};
use prometheus::{Counter, CounterVec, Gauge, HistogramVec};
use std::time::Instant;

use super::error::MetricsError;
use super::MetricsRegistry;

pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";
pub const HTTP_LABELS: [&str; 3] = ["method", "endpoint", "status"];
pub const HTTP_DURATION_BUCKETS: [f64; 8] = [0.01, 0.05, 0.1, 0.3, 0.5, 1.0, 2.0, 5.0];

pub const BUSINESS_ORDERS_TOTAL: &str = "business_orders_total";
pub const BUSINESS_REVENUE_EUROS: &str = "business_revenue_euros";
pub const BUSINESS_ACTIVE_USERS: &str = "business_active_users";

/// Collector for HTTP request metrics
#[derive(Clone)]
pub struct HttpMetricsCollector {
    requests_total: CounterVec,
    request_duration_seconds: HistogramVec,
}

impl HttpMetricsCollector {
    pub fn register(metrics: &MetricsRegistry) -> Result<Self, MetricsError> {
        let requests_total =
            metrics.counter_vec(HTTP_REQUESTS_TOTAL, "Total HTTP requests", &HTTP_LABELS)?;

        let request_duration_seconds = metrics.histogram_vec(
            HTTP_REQUEST_DURATION_SECONDS,
            "HTTP request duration",
            &HTTP_LABELS,
            &HTTP_DURATION_BUCKETS,
        )?;

        Ok(Self {
            requests_total,
            request_duration_seconds,
        })
    }

    /// Record one finished request. Never fails: a label mismatch is logged
    /// and the observation dropped.
    pub fn record_request(&self, method: &str, endpoint: &str, status: u16, duration_secs: f64) {
        let status = status.to_string();
        let labels = [method, endpoint, status.as_str()];

        match self.requests_total.get_metric_with_label_values(&labels) {
            Ok(counter) => counter.inc(),
            Err(e) => tracing::warn!("Failed to record {}: {}", HTTP_REQUESTS_TOTAL, e),
        }

        match self.request_duration_seconds.get_metric_with_label_values(&labels) {
            Ok(histogram) => histogram.observe(duration_secs),
            Err(e) => tracing::warn!("Failed to record {}: {}", HTTP_REQUEST_DURATION_SECONDS, e),
        }
    }

    /// Current count for one label combination, without creating the series
    pub fn request_count(&self, method: &str, endpoint: &str, status: u16) -> f64 {
        find_series(&self.requests_total.collect(), method, endpoint, status)
            .map(|m| m.get_counter().get_value())
            .unwrap_or(0.0)
    }

    /// Observations recorded for one label combination, without creating the series
    pub fn duration_sample_count(&self, method: &str, endpoint: &str, status: u16) -> u64 {
        find_series(&self.request_duration_seconds.collect(), method, endpoint, status)
            .map(|m| m.get_histogram().get_sample_count())
            .unwrap_or(0)
    }

    /// Total seconds observed for one label combination
    pub fn duration_sum(&self, method: &str, endpoint: &str, status: u16) -> f64 {
        find_series(&self.request_duration_seconds.collect(), method, endpoint, status)
            .map(|m| m.get_histogram().get_sample_sum())
            .unwrap_or(0.0)
    }
}

fn find_series(
    families: &[MetricFamily],
    method: &str,
    endpoint: &str,
    status: u16,
) -> Option<Metric> {
    let status = status.to_string();
    let wanted = [method, endpoint, status.as_str()];

    families
        .iter()
        .flat_map(|family| family.get_metric())
        .find(|metric| {
            HTTP_LABELS.iter().zip(wanted.iter()).all(|(name, value)| {
                metric
                    .get_label()
                    .iter()
                    .any(|pair| pair.get_name() == *name && pair.get_value() == *value)
            })
        })
        .cloned()
}

/// Collector for business metrics
#[derive(Clone)]
pub struct BusinessMetricsCollector {
    orders_total: Counter,
    revenue_euros: Counter,
    active_users: Gauge,
}

impl BusinessMetricsCollector {
    pub fn register(metrics: &MetricsRegistry) -> Result<Self, MetricsError> {
        Ok(Self {
            orders_total: metrics.counter(BUSINESS_ORDERS_TOTAL, "Total orders created")?,
            revenue_euros: metrics.counter(BUSINESS_REVENUE_EUROS, "Total revenue in euros")?,
            active_users: metrics.gauge(BUSINESS_ACTIVE_USERS, "Number of active users")?,
        })
    }

    pub fn record_order(&self, amount_euros: f64) {
        self.orders_total.inc();
        // Counters reject negative increments
        if amount_euros >= 0.0 {
            self.revenue_euros.inc_by(amount_euros);
        } else {
            tracing::warn!("Ignoring negative order amount: {}", amount_euros);
        }
    }

    pub fn set_active_users(&self, count: f64) {
        self.active_users.set(count);
    }

    /// Gauge handle for the periodic sampler
    pub fn active_users_gauge(&self) -> Gauge {
        self.active_users.clone()
    }

    pub fn orders(&self) -> f64 {
        self.orders_total.get()
    }

    pub fn revenue(&self) -> f64 {
        self.revenue_euros.get()
    }

    pub fn active_users(&self) -> f64 {
        self.active_users.get()
    }
}

/// Timer helper for measuring durations
pub struct MetricsTimer {
    start: Instant,
}

impl MetricsTimer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

impl Default for MetricsTimer {
    fn default() -> Self {
        Self::new()
    }
}
