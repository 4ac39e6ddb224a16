//! Observability module for goapp.
//!
//! Provides the metric registry and the three goapp instruments.

pub mod metrics;
