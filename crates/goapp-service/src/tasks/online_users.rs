//! Online users background task.
//!
//! Overwrites the `goapp_online_users` gauge with a fresh uniform value in
//! `[0, 2000)` once per interval. Writes are not coordinated with request
//! handling; scrapes see whichever value was stored last.
//!
//! # Shutdown
//!
//! The task runs until its cancellation token is triggered.

use crate::observability::metrics::GoappMetrics;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Exclusive upper bound of the simulated online-user count.
pub const MAX_ONLINE_USERS: u32 = 2_000;

/// Draw a simulated online-user count in `[0, MAX_ONLINE_USERS)`.
pub fn draw_online_users() -> u32 {
    rand::thread_rng().gen_range(0..MAX_ONLINE_USERS)
}

/// Run the online users updater loop.
///
/// The first update happens immediately, then once per `interval`.
pub async fn start_online_users_updater(
    metrics: Arc<GoappMetrics>,
    interval: Duration,
    cancel_token: CancellationToken,
) {
    info!(
        interval_ms = interval.as_millis() as u64,
        "Online users updater started"
    );

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let value = draw_online_users();
                metrics.set_online_users(value);
                debug!(online_users = value, "Updated online users gauge");
            }
            _ = cancel_token.cancelled() => {
                info!("Online users updater received shutdown signal, exiting");
                break;
            }
        }
    }
}
