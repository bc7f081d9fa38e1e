use axum::http::StatusCode;
use serde_json::json;
use techshop_service::config::ServiceRole;

use crate::common::{sample_value, test_config, TestContext};

#[tokio::test]
async fn health_returns_service_identity() {
    let ctx = TestContext::new(test_config("payment-service", ServiceRole::Generic, 0.0));

    let response = ctx.server.get("/health").await;

    response.assert_status(StatusCode::OK);
    response.assert_json(&json!({
        "status": "healthy",
        "service": "payment-service"
    }));
}

#[tokio::test]
async fn health_is_excluded_from_request_metrics_by_default() {
    let ctx = TestContext::with_error_rate(0.0);

    ctx.server.get("/health").await.assert_status_ok();

    let output = ctx.scrape().await;
    assert!(!output.contains("endpoint=\"/health\""));
    assert!(!output.contains("endpoint=\"/metrics\""));
    assert_eq!(ctx.state.http_metrics.request_count("GET", "/health", 200), 0.0);
}

#[tokio::test]
async fn health_is_counted_when_probe_exclusion_is_disabled() {
    let mut config = test_config("test-service", ServiceRole::Generic, 0.0);
    config.exclude_probes = false;
    let ctx = TestContext::new(config);

    ctx.server.get("/health").await.assert_status_ok();

    let output = ctx.scrape().await;
    assert_eq!(
        sample_value(
            &output,
            "http_requests_total",
            &[("method", "GET"), ("endpoint", "/health"), ("status", "200")]
        ),
        Some(1.0)
    );
}
