//! Metrics upkeep background task.
//!
//! The goapp recorder is not installed globally, so nothing drains its
//! histogram buffers between scrapes. This task calls `run_upkeep` on a
//! fixed period so buffered samples stay bounded when nobody scrapes.

use crate::observability::metrics::GoappMetrics;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Default upkeep interval in seconds.
pub const DEFAULT_UPKEEP_INTERVAL_SECONDS: u64 = 5;

/// Run the metrics upkeep loop until the cancellation token is triggered.
pub async fn start_metrics_upkeep(metrics: Arc<GoappMetrics>, cancel_token: CancellationToken) {
    let mut interval =
        tokio::time::interval(Duration::from_secs(DEFAULT_UPKEEP_INTERVAL_SECONDS));

    loop {
        tokio::select! {
            _ = interval.tick() => {
                metrics.run_upkeep();
            }
            _ = cancel_token.cancelled() => {
                info!("Metrics upkeep task received shutdown signal, exiting");
                break;
            }
        }
    }
}
