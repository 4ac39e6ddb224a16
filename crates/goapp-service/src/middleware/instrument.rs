//! Per-handler instrumentation middleware.
//!
//! Wraps a single route so that every invocation:
//! - is timed into `goapp_http_requests_duration{handler="<name>"}`
//! - increments `goapp_http_requests_total` once it completes
//!
//! The duration is recorded by a drop guard, so it is captured on every exit
//! path: normal return, panic unwinding, and the request future being dropped
//! (client disconnect, timeout layer).

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use metrics::{Counter, Histogram};
use std::time::Instant;

use crate::observability::metrics::GoappMetrics;

/// Instruments bound to one handler label.
#[derive(Clone)]
pub struct InstrumentState {
    duration: Histogram,
    requests: Counter,
}

impl InstrumentState {
    /// Curry the duration histogram with `handler` and share the request counter.
    pub fn new(metrics: &GoappMetrics, handler: &str) -> Self {
        Self {
            duration: metrics.request_duration(handler),
            requests: metrics.requests_counter(),
        }
    }
}

/// Records the elapsed time into a histogram when dropped.
pub struct RequestTimer {
    histogram: Histogram,
    start: Instant,
}

impl RequestTimer {
    pub fn start(histogram: Histogram) -> Self {
        Self {
            histogram,
            start: Instant::now(),
        }
    }
}

impl Drop for RequestTimer {
    fn drop(&mut self) {
        self.histogram.record(self.start.elapsed().as_secs_f64());
    }
}

/// Middleware that times the wrapped handler and counts completed requests.
///
/// Apply per route with `axum::middleware::from_fn_with_state`. Attach it
/// with `route_layer` (or to a method-agnostic route) so that a 405 answered
/// by the method router is not mistaken for a handler invocation.
pub async fn instrument_request(
    State(state): State<InstrumentState>,
    request: Request,
    next: Next,
) -> Response {
    let _timer = RequestTimer::start(state.duration.clone());

    let response = next.run(request).await;

    state.requests.increment(1);
    response
}
