//! Prometheus metrics endpoint handler.
//!
//! This endpoint is unauthenticated to allow Prometheus to scrape metrics.
//! It is deliberately left out of the instrumentation layer, so scrapes do
//! not move `goapp_http_requests_total`.

use axum::{extract::State, http::header, response::IntoResponse};
use std::sync::Arc;

use crate::observability::metrics::GoappMetrics;

/// Content type of the Prometheus text exposition format.
pub const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Handler for GET /metrics
///
/// Returns 200 OK with Prometheus text format:
/// ```text
/// # HELP goapp_http_requests_total Count of all HTTP requests for goapp
/// # TYPE goapp_http_requests_total counter
/// goapp_http_requests_total 42
/// ```
#[tracing::instrument(skip_all, name = "goapp.metrics.scrape")]
pub async fn metrics_handler(State(metrics): State<Arc<GoappMetrics>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)],
        metrics.render(),
    )
}
