//! goapp Service
//!
//! Entry point for the instrumented demo HTTP service.
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment
//! 2. Register the goapp instruments on a fresh metrics registry
//! 3. Spawn background tasks (online users updater, metrics upkeep)
//! 4. Bind the HTTP listener (fatal on failure)
//! 5. Serve until killed, or until SIGINT/SIGTERM when graceful shutdown is on

use goapp_service::config::Config;
use goapp_service::errors::GoappError;
use goapp_service::observability::metrics::GoappMetrics;
use goapp_service::routes::{self, AppState};
use goapp_service::tasks;
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "goapp_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting goapp service");

    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        GoappError::from(e)
    })?;

    info!(
        bind_address = %config.bind_address,
        online_users_update_interval_ms = config.online_users_update_interval.as_millis() as u64,
        request_timeout_seconds = config.request_timeout.map(|t| t.as_secs()),
        graceful_shutdown = config.graceful_shutdown,
        "Configuration loaded successfully"
    );

    let metrics = Arc::new(GoappMetrics::new().map_err(|e| {
        error!("Failed to register metrics: {}", e);
        GoappError::from(e)
    })?);

    let cancel_token = CancellationToken::new();
    let task_handles = tasks::spawn_background_tasks(&metrics, &config, &cancel_token);

    let bind_address = config.bind_address;
    let graceful_shutdown = config.graceful_shutdown;
    let app = routes::build_routes(AppState { metrics, config });

    let listener = tokio::net::TcpListener::bind(bind_address)
        .await
        .map_err(|e| {
            error!("Failed to bind {}: {}", bind_address, e);
            GoappError::Bind(e)
        })?;

    info!("goapp service listening on {}", bind_address);

    if graceful_shutdown {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(GoappError::Serve)?;
    } else {
        axum::serve(listener, app)
            .await
            .map_err(GoappError::Serve)?;
    }

    cancel_token.cancel();
    for handle in task_handles {
        if let Err(e) = handle.await {
            error!("Background task failed: {}", e);
        }
    }

    info!("goapp service shutdown complete");

    Ok(())
}

/// Listens for shutdown signals (SIGTERM, SIGINT).
async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received SIGINT, starting graceful shutdown..."),
            Err(e) => error!("Failed to listen for SIGINT: {}", e),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received SIGTERM, starting graceful shutdown...");
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
