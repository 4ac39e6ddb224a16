//! HTTP request handlers for goapp.

pub mod metrics;
pub mod simulated;

pub use metrics::metrics_handler;
pub use simulated::{contact, home, SimulatedEndpoint, CONTACT, HOME};
