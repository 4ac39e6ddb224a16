//! goapp Service Library
//!
//! A small HTTP service showing how request instrumentation is wired into a
//! web server:
//!
//! - Two simulated endpoints (`/` and `/contact`) with random latency
//! - A request counter and a per-handler request duration histogram
//! - A simulated "online users" gauge refreshed by a background task
//! - A Prometheus `/metrics` endpoint exposing all three
//!
//! # Architecture
//!
//! ```text
//! routes/mod.rs -> middleware/instrument.rs -> handlers/*.rs
//!                                  \-> observability/metrics.rs <- tasks/*.rs
//! ```
//!
//! # Modules
//!
//! - `config` - Service configuration from environment
//! - `errors` - Startup error types
//! - `handlers` - HTTP request handlers
//! - `middleware` - Per-handler instrumentation
//! - `observability` - Metric registry and instruments
//! - `routes` - Axum router setup
//! - `tasks` - Background tasks

pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod routes;
pub mod tasks;
