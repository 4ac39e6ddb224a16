//! Background tasks for goapp.
//!
//! - `online_users`: refreshes the simulated online-users gauge
//! - `metrics_upkeep`: drains histogram buffers of the local recorder

pub mod metrics_upkeep;
pub mod online_users;

use crate::config::Config;
use crate::observability::metrics::GoappMetrics;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub use metrics_upkeep::start_metrics_upkeep;
pub use online_users::start_online_users_updater;

/// Spawn every background task. All of them stop when `cancel_token` fires.
pub fn spawn_background_tasks(
    metrics: &Arc<GoappMetrics>,
    config: &Config,
    cancel_token: &CancellationToken,
) -> Vec<JoinHandle<()>> {
    vec![
        tokio::spawn(start_online_users_updater(
            Arc::clone(metrics),
            config.online_users_update_interval,
            cancel_token.clone(),
        )),
        tokio::spawn(start_metrics_upkeep(
            Arc::clone(metrics),
            cancel_token.clone(),
        )),
    ]
}
