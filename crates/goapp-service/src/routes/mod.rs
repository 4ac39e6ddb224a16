//! HTTP routes for goapp.
//!
//! Defines the Axum router and application state.

use crate::config::Config;
use crate::handlers::{self, CONTACT, HOME};
use crate::middleware::{instrument_request, InstrumentState};
use crate::observability::metrics::GoappMetrics;
use axum::{
    middleware,
    routing::{any, get},
    Router,
};
use std::sync::Arc;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The goapp instruments.
    pub metrics: Arc<GoappMetrics>,

    /// Service configuration.
    pub config: Config,
}

/// Build the application routes.
///
/// Creates an Axum router with:
/// - `/contact` - Simulated contact page, instrumented as `handler="contact"`
/// - `/metrics` - Prometheus metrics endpoint, not instrumented
/// - `/` and every unmatched path - Simulated home page, instrumented as
///   `handler="home"`
/// - TraceLayer for request logging
/// - Optional request timeout (`REQUEST_TIMEOUT_SECONDS`)
///
/// The simulated pages answer any method, and `/` is a catch-all the way a
/// subtree pattern is, so `/about` is served (and counted) as home.
pub fn build_routes(state: AppState) -> Router {
    let home_instruments = InstrumentState::new(&state.metrics, HOME.name);
    let contact_instruments = InstrumentState::new(&state.metrics, CONTACT.name);

    // `layer`, not `route_layer`: the fallback must be instrumented too
    let home: Router<Arc<GoappMetrics>> = Router::new()
        .route("/", any(handlers::home))
        .fallback(handlers::home)
        .layer(middleware::from_fn_with_state(
            home_instruments,
            instrument_request,
        ));

    let contact: Router<Arc<GoappMetrics>> = Router::new()
        .route("/contact", any(handlers::contact))
        .route_layer(middleware::from_fn_with_state(
            contact_instruments,
            instrument_request,
        ));

    let router = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .merge(contact)
        .merge(home)
        .with_state(state.metrics);

    // Layer order (bottom-to-top execution):
    // 1. TimeoutLayer - Timeout the request (innermost, optional)
    // 2. TraceLayer - Log request details
    let router = match state.config.request_timeout {
        Some(timeout) => router.layer(TimeoutLayer::new(timeout)),
        None => router,
    };

    router.layer(TraceLayer::new_for_http())
}
