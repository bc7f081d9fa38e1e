use std::time::Duration;
use techshop_service::config::ServiceRole;
use techshop_service::spawn_samplers;

use crate::common::{sample_value, test_config, TestContext};

#[tokio::test]
async fn metrics_uses_exposition_content_type() {
    let ctx = TestContext::with_error_rate(0.0);

    let response = ctx.server.get("/metrics").await;
    response.assert_status_ok();

    let content_type = response.header("content-type");
    assert_eq!(content_type.to_str().unwrap(), "text/plain; version=0.0.4");
}

#[tokio::test]
async fn metrics_lists_business_metric_headers() {
    let ctx = TestContext::new(test_config("order-service", ServiceRole::Order, 0.0));
    ctx.server.post("/api/action").await.assert_status_ok();

    let output = ctx.scrape().await;
    assert!(output.contains("# HELP business_orders_total Total orders created"));
    assert!(output.contains("# TYPE business_orders_total counter"));
    assert!(output.contains("# HELP business_revenue_euros Total revenue in euros"));
    assert!(output.contains("# TYPE business_active_users gauge"));
}

#[tokio::test]
async fn scraping_does_not_change_metrics() {
    let ctx = TestContext::with_error_rate(0.0);
    ctx.server.get("/api/items").await.assert_status_ok();

    let first = ctx.scrape().await;
    let second = ctx.scrape().await;

    let labels = [("method", "GET"), ("endpoint", "/api/items"), ("status", "200")];
    assert_eq!(sample_value(&first, "http_requests_total", &labels), Some(1.0));
    assert_eq!(sample_value(&second, "http_requests_total", &labels), Some(1.0));
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn metrics_include_prefixed_process_metrics() {
    let ctx = TestContext::new(test_config("order-service", ServiceRole::Order, 0.0));

    let output = ctx.scrape().await;
    assert!(output.contains("order_service_process_start_time_seconds"));
}

#[tokio::test(start_paused = true)]
async fn user_service_sampler_feeds_active_users() {
    let mut config = test_config("user-service", ServiceRole::User, 0.0);
    config.sampler_interval = Duration::from_secs(5);
    let ctx = TestContext::new(config);

    let samplers = spawn_samplers(&ctx.state);
    assert_eq!(samplers.len(), 1);

    tokio::time::sleep(Duration::from_secs(11)).await;

    let active = ctx.state.business_metrics.active_users();
    assert!((20.0..70.0).contains(&active), "active users {}", active);

    for sampler in samplers {
        sampler.shutdown().await;
    }
}

#[tokio::test]
async fn other_roles_run_no_samplers() {
    let ctx = TestContext::new(test_config("order-service", ServiceRole::Order, 0.0));
    assert!(spawn_samplers(&ctx.state).is_empty());
}
