#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("Metric already registered: {0}")]
    DuplicateName(String),

    #[error("Invalid buckets for {name}: {reason}")]
    InvalidBuckets { name: String, reason: String },

    #[error("Failed to render metrics: {0}")]
    Render(String),

    #[error("Prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}
