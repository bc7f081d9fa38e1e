use techshop_service::config::Config;
use techshop_service::services::metrics::MetricsRegistry;
use techshop_service::{create_app, logging, spawn_samplers, AppState};
use tokio::signal;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env().expect("Failed to load environment configuration");

    logging::init(&config.service_name);

    let metrics = MetricsRegistry::new(&config.metric_prefix())
        .expect("Failed to initialize metrics registry");
    tracing::info!(prefix = metrics.prefix(), "Metrics registry ready");

    if let Some(host) = &config.db_host {
        tracing::info!(db_host = %host, "Database endpoint configured");
    }
    if let Some(host) = &config.redis_host {
        tracing::info!(redis_host = %host, "Redis endpoint configured");
    }

    let port = config.port;
    let state = AppState::new(config, metrics).expect("Failed to register service metrics");
    let samplers = spawn_samplers(&state);

    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .expect("Failed to bind listener");
    tracing::info!(port = port, "Service started");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("Server error: {}", e);
    }

    for sampler in samplers {
        sampler.shutdown().await;
    }

    tracing::info!("Service stopped");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
