//! Simulated endpoints.
//!
//! - `/`: "Hello FullCycle" after up to 1 second
//! - `/contact`: "Contato" after up to 5 seconds
//!
//! Each request draws a fresh uniform delay from the thread-local generator
//! and suspends its task for that long. There is no failure path.

use axum::http::StatusCode;
use rand::Rng;
use std::time::Duration;

/// An endpoint that answers a fixed body after a random delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatedEndpoint {
    /// Value of the `handler` label for this endpoint.
    pub name: &'static str,
    /// Exclusive upper bound of the delay, in milliseconds.
    pub max_delay_ms: u64,
    pub body: &'static str,
}

pub const HOME: SimulatedEndpoint = SimulatedEndpoint {
    name: "home",
    max_delay_ms: 1_000,
    body: "Hello FullCycle",
};

pub const CONTACT: SimulatedEndpoint = SimulatedEndpoint {
    name: "contact",
    max_delay_ms: 5_000,
    body: "Contato",
};

impl SimulatedEndpoint {
    /// Draw a delay in `[0, max_delay_ms)` milliseconds.
    pub fn draw_delay(&self) -> Duration {
        Duration::from_millis(rand::thread_rng().gen_range(0..self.max_delay_ms))
    }

    /// Wait a random delay, then answer 200 with the fixed body.
    pub async fn serve(&self) -> (StatusCode, &'static str) {
        let delay = self.draw_delay();
        tracing::trace!(handler = self.name, delay_ms = delay.as_millis() as u64, "Simulating work");
        tokio::time::sleep(delay).await;
        (StatusCode::OK, self.body)
    }
}

/// Handler for GET /
pub async fn home() -> (StatusCode, &'static str) {
    HOME.serve().await
}

/// Handler for GET /contact
pub async fn contact() -> (StatusCode, &'static str) {
    CONTACT.serve().await
}
