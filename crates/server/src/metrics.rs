//! Prometheus metrics

use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

static PROMETHEUS: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the global Prometheus recorder. Safe to call more than once.
pub fn init_metrics() -> Option<PrometheusHandle> {
    PROMETHEUS
        .get_or_try_init(|| PrometheusBuilder::new().install_recorder())
        .map_err(|e| tracing::warn!(error = %e, "Prometheus recorder not installed"))
        .ok()
        .cloned()
}

/// `GET /metrics`
pub async fn metrics_handler() -> impl IntoResponse {
    let body = PROMETHEUS.get().map(|h| h.render()).unwrap_or_default();
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
}

pub fn record_request(endpoint: &'static str) {
    metrics::counter!("akara_http_requests_total", "endpoint" => endpoint).increment(1);
}

pub fn record_pipeline_latency(seconds: f64) {
    metrics::histogram!("akara_pipeline_duration_seconds").record(seconds);
}

pub fn record_pipeline_error(kind: &'static str) {
    metrics::counter!("akara_pipeline_errors_total", "kind" => kind).increment(1);
}
