use axum::{
    body::Body,
    extract::{MatchedPath, Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};
use http_body::{Body as HttpBody, Frame, SizeHint};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{ready, Context, Poll};

use super::collectors::{HttpMetricsCollector, MetricsTimer};
use crate::AppState;

/// Paths that are only instrumented when probe exclusion is disabled
pub const PROBE_PATHS: [&str; 2] = ["/health", "/metrics"];

/// Endpoint label for requests no route matched
pub const UNMATCHED_ENDPOINT: &str = "unmatched";

/// Method label for anything outside the standard set
pub const OTHER_METHOD: &str = "OTHER";

const STANDARD_METHODS: [Method; 9] = [
    Method::GET,
    Method::HEAD,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::CONNECT,
    Method::OPTIONS,
    Method::TRACE,
    Method::PATCH,
];

/// Middleware to collect HTTP request metrics and emit the access log line.
///
/// The observation is made once the response body has finished streaming
/// (or was dropped), so duration covers the whole response.
pub async fn metrics_middleware(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let timer = MetricsTimer::new();
    let method = req.method().to_string();
    let path = req.uri().path().to_string();

    let excluded = state.config.exclude_probes && PROBE_PATHS.contains(&path.as_str());
    let labels = (!excluded).then(|| RequestLabels {
        collector: state.http_metrics.clone(),
        method: method_label(req.method()),
        endpoint: match req.extensions().get::<MatchedPath>() {
            Some(matched) => matched.as_str().to_string(),
            None => UNMATCHED_ENDPOINT.to_string(),
        },
    });

    let response = next.run(req).await;

    let completion = Completion {
        labels,
        method,
        path,
        status: response.status().as_u16(),
        timer,
    };

    let (parts, body) = response.into_parts();
    Response::from_parts(parts, Body::new(InstrumentedBody::new(body, completion)))
}

fn method_label(method: &Method) -> String {
    if STANDARD_METHODS.contains(method) {
        method.as_str().to_string()
    } else {
        OTHER_METHOD.to_string()
    }
}

struct RequestLabels {
    collector: HttpMetricsCollector,
    method: String,
    endpoint: String,
}

/// Records the request when dropped
struct Completion {
    labels: Option<RequestLabels>,
    method: String,
    path: String,
    status: u16,
    timer: MetricsTimer,
}

impl Drop for Completion {
    fn drop(&mut self) {
        let duration = self.timer.elapsed_secs();

        if let Some(labels) = &self.labels {
            labels
                .collector
                .record_request(&labels.method, &labels.endpoint, self.status, duration);
        }
        log_request(&self.method, &self.path, self.status, duration);
    }
}

pin_project_lite::pin_project! {
    /// Response body that completes its request after the last frame, on a
    /// body error, or when dropped early.
    struct InstrumentedBody<B> {
        #[pin]
        inner: B,
        completion: Option<Completion>,
    }
}

impl<B> InstrumentedBody<B> {
    fn new(inner: B, completion: Completion) -> Self {
        Self {
            inner,
            completion: Some(completion),
        }
    }
}

impl<B> HttpBody for InstrumentedBody<B>
where
    B: HttpBody,
{
    type Data = B::Data;
    type Error = B::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let mut this = self.project();
        let frame = ready!(this.inner.as_mut().poll_frame(cx));

        let finished = match &frame {
            Some(Ok(_)) => this.inner.is_end_stream(),
            Some(Err(_)) | None => true,
        };
        if finished {
            this.completion.take();
        }

        Poll::Ready(frame)
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warn,
    Error,
}

impl Severity {
    pub fn from_status(status: u16) -> Self {
        if status >= 500 {
            Self::Error
        } else if status >= 400 {
            Self::Warn
        } else {
            Self::Info
        }
    }
}

fn log_request(method: &str, path: &str, status: u16, duration_seconds: f64) {
    match Severity::from_status(status) {
        Severity::Error => {
            tracing::error!(method = method, path = path, status = status, duration_seconds = duration_seconds)
        }
        Severity::Warn => {
            tracing::warn!(method = method, path = path, status = status, duration_seconds = duration_seconds)
        }
        Severity::Info => {
            tracing::info!(method = method, path = path, status = status, duration_seconds = duration_seconds)
        }
    }
}
