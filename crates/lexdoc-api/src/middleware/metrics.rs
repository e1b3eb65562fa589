//! # HTTP Metrics
//!
//! Request counters and latency histograms recorded through the `metrics`
//! facade. The Prometheus recorder is installed once by the binary; when
//! no recorder is installed these calls are no-ops.
//!
//! Mounted with `route_layer`, so the `path` label is the matched route
//! template (`/v1/documents/{id}`), not the raw URI.

use std::time::Instant;

use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::Response;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Install the global Prometheus recorder and return its render handle.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16().to_string();
    metrics::histogram!(
        "lexdoc_http_request_duration_seconds",
        "method" => method.clone(),
        "path" => path.clone()
    )
    .record(started.elapsed().as_secs_f64());
    if response.status().is_client_error() || response.status().is_server_error() {
        metrics::counter!(
            "lexdoc_http_errors_total",
            "method" => method.clone(),
            "path" => path.clone(),
            "status" => status.clone()
        )
        .increment(1);
    }
    metrics::counter!(
        "lexdoc_http_requests_total",
        "method" => method,
        "path" => path,
        "status" => status
    )
    .increment(1);

    response
}
