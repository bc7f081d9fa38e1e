use prometheus::proto::MetricFamily;
use techshop_service::services::metrics::collectors::*;
use techshop_service::services::metrics::MetricsRegistry;

use crate::common::sample_value;

// =============================================================================
// INTEGRATION TESTS - METRICS COLLECTORS
// =============================================================================

fn family<'a>(families: &'a [MetricFamily], name: &str) -> &'a MetricFamily {
    families
        .iter()
        .find(|f| f.get_name() == name)
        .expect("metric family not found")
}

#[test]
fn test_http_request_recording() {
    let metrics = MetricsRegistry::empty("test");
    let collector = HttpMetricsCollector::register(&metrics).unwrap();

    collector.record_request("GET", "/api/items", 200, 0.042);

    let output = metrics.export().unwrap();
    assert!(output.contains("# TYPE http_requests_total counter"));
    assert!(output.contains("# TYPE http_request_duration_seconds histogram"));

    let labels = [("method", "GET"), ("endpoint", "/api/items"), ("status", "200")];
    assert_eq!(sample_value(&output, "http_requests_total", &labels), Some(1.0));
    assert_eq!(
        sample_value(&output, "http_request_duration_seconds_count", &labels),
        Some(1.0)
    );
    assert_eq!(
        sample_value(&output, "http_request_duration_seconds_sum", &labels),
        Some(0.042)
    );
}

#[test]
fn test_counts_match_request_sequence() {
    let metrics = MetricsRegistry::empty("test");
    let collector = HttpMetricsCollector::register(&metrics).unwrap();

    let statuses = [200, 200, 500, 404, 200, 500, 200];
    for (i, status) in statuses.iter().enumerate() {
        collector.record_request("GET", "/api/items", *status, i as f64 * 0.1);
    }

    let total: f64 = [200, 404, 500]
        .iter()
        .map(|s| collector.request_count("GET", "/api/items", *s))
        .sum();
    let observed: u64 = [200, 404, 500]
        .iter()
        .map(|s| collector.duration_sample_count("GET", "/api/items", *s))
        .sum();

    assert_eq!(total, statuses.len() as f64);
    assert_eq!(observed, statuses.len() as u64);
    assert_eq!(collector.request_count("GET", "/api/items", 200), 4.0);
    assert_eq!(collector.request_count("GET", "/api/items", 500), 2.0);
    assert_eq!(collector.request_count("GET", "/api/items", 404), 1.0);
}

#[test]
fn test_reading_counts_does_not_create_series() {
    let metrics = MetricsRegistry::empty("test");
    let collector = HttpMetricsCollector::register(&metrics).unwrap();

    assert_eq!(collector.request_count("GET", "/health", 200), 0.0);
    assert!(!metrics.export().unwrap().contains("/health"));
}

#[test]
fn test_histogram_buckets_are_cumulative() {
    let metrics = MetricsRegistry::empty("test");
    let collector = HttpMetricsCollector::register(&metrics).unwrap();

    let durations = [0.005, 0.02, 0.07, 0.2, 0.4, 0.9, 1.5, 3.0, 7.5, 0.05];
    for duration in durations {
        collector.record_request("POST", "/api/action", 200, duration);
    }

    let families = metrics.registry().gather();
    let histogram_family = family(&families, HTTP_REQUEST_DURATION_SECONDS);
    let histogram = histogram_family.get_metric()[0].get_histogram();
    let buckets = histogram.get_bucket();

    let bounds: Vec<f64> = buckets.iter().map(|b| b.get_upper_bound()).collect();
    assert_eq!(bounds, HTTP_DURATION_BUCKETS.to_vec());

    for pair in buckets.windows(2) {
        assert!(pair[0].get_cumulative_count() <= pair[1].get_cumulative_count());
    }

    // 0.05 lands in the 0.05 bucket (upper bound inclusive)
    assert_eq!(buckets[0].get_cumulative_count(), 1);
    assert_eq!(buckets[1].get_cumulative_count(), 3);
    assert_eq!(buckets[7].get_cumulative_count(), 9);
    assert_eq!(histogram.get_sample_count(), durations.len() as u64);

    let output = metrics.export().unwrap();
    let inf = sample_value(
        &output,
        "http_request_duration_seconds_bucket",
        &[
            ("method", "POST"),
            ("endpoint", "/api/action"),
            ("status", "200"),
            ("le", "+Inf"),
        ],
    );
    assert_eq!(inf, Some(durations.len() as f64));
}

#[test]
fn test_business_metrics_collector() {
    let metrics = MetricsRegistry::empty("test");
    let collector = BusinessMetricsCollector::register(&metrics).unwrap();

    collector.record_order(120.0);
    collector.record_order(35.0);
    collector.set_active_users(42.0);

    assert_eq!(collector.orders(), 2.0);
    assert_eq!(collector.revenue(), 155.0);
    assert_eq!(collector.active_users(), 42.0);

    let output = metrics.export().unwrap();
    assert_eq!(sample_value(&output, BUSINESS_ORDERS_TOTAL, &[]), Some(2.0));
    assert_eq!(sample_value(&output, BUSINESS_REVENUE_EUROS, &[]), Some(155.0));
    assert_eq!(sample_value(&output, BUSINESS_ACTIVE_USERS, &[]), Some(42.0));
}

#[test]
fn test_negative_revenue_is_ignored() {
    let metrics = MetricsRegistry::empty("test");
    let collector = BusinessMetricsCollector::register(&metrics).unwrap();

    collector.record_order(-10.0);

    assert_eq!(collector.orders(), 1.0);
    assert_eq!(collector.revenue(), 0.0);
}

#[test]
fn test_metrics_timer() {
    let timer = MetricsTimer::new();

    std::thread::sleep(std::time::Duration::from_millis(100));

    let elapsed = timer.elapsed_secs();
    assert!(elapsed >= 0.1, "Timer should measure at least 0.1 seconds");
    assert!(elapsed < 1.0, "Timer should measure less than 1 second");
}
