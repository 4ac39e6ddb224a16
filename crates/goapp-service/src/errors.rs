//! goapp error types.
//!
//! Request handling has no error path: both simulated endpoints always
//! answer 200. Every error here is a startup failure that stops the process
//! before traffic is served.

use crate::config::ConfigError;
use thiserror::Error;

/// Metric registry errors.
///
/// All of these are configuration mistakes detected while wiring the
/// registry, never during request serving.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Metric already registered: {0}")]
    DuplicateRegistration(String),

    #[error("Invalid histogram buckets: {0}")]
    BucketConfiguration(String),
}

/// Top-level startup error for the goapp service.
#[derive(Debug, Error)]
pub enum GoappError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Metrics error: {0}")]
    Metrics(#[from] MetricsError),

    #[error("Failed to bind listener: {0}")]
    Bind(#[source] std::io::Error),

    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),
}
