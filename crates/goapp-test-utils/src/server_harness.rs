//! Test server harness for E2E testing
//!
//! Provides `TestGoappServer` for spawning real goapp server instances in tests.

use crate::exposition::Scrape;
use goapp_service::config::Config;
use goapp_service::observability::metrics::GoappMetrics;
use goapp_service::routes::{self, AppState};
use goapp_service::tasks;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Gauge refresh period used by test servers, short so tests see updates quickly.
pub const TEST_UPDATE_INTERVAL_MS: &str = "10";

/// Test harness for spawning the goapp server in E2E tests.
///
/// Every instance owns an isolated metrics registry, so tests can run in
/// parallel without sharing counters.
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_home_e2e() -> Result<(), anyhow::Error> {
///     let server = TestGoappServer::spawn().await?;
///
///     let response = server.get("/").await?;
///
///     assert_eq!(response.status(), 200);
///     Ok(())
/// }
/// ```
pub struct TestGoappServer {
    addr: SocketAddr,
    config: Config,
    metrics: Arc<GoappMetrics>,
    client: reqwest::Client,
    cancel_token: CancellationToken,
    _handle: JoinHandle<()>,
}

impl TestGoappServer {
    /// Spawn a new test server instance with default test configuration.
    ///
    /// The server will:
    /// - Bind to a random available port (127.0.0.1:0)
    /// - Start the online users updater and metrics upkeep tasks
    /// - Start the HTTP server in the background
    pub async fn spawn() -> Result<Self, anyhow::Error> {
        Self::spawn_with_vars(HashMap::new()).await
    }

    /// Spawn a test server, overriding configuration variables.
    pub async fn spawn_with_vars(
        overrides: HashMap<String, String>,
    ) -> Result<Self, anyhow::Error> {
        let mut vars = HashMap::from([
            ("BIND_ADDRESS".to_string(), "127.0.0.1:0".to_string()),
            (
                "ONLINE_USERS_UPDATE_INTERVAL_MS".to_string(),
                TEST_UPDATE_INTERVAL_MS.to_string(),
            ),
        ]);
        vars.extend(overrides);

        let config = Config::from_vars(&vars)
            .map_err(|e| anyhow::anyhow!("Failed to create config: {}", e))?;

        let metrics = Arc::new(
            GoappMetrics::new().map_err(|e| anyhow::anyhow!("Failed to create metrics: {}", e))?,
        );

        let cancel_token = CancellationToken::new();
        tasks::spawn_background_tasks(&metrics, &config, &cancel_token);

        // Build routes using goapp-service's real route builder
        let app = routes::build_routes(AppState {
            metrics: Arc::clone(&metrics),
            config: config.clone(),
        });

        let listener = tokio::net::TcpListener::bind(config.bind_address)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        // Spawn server in background
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            config,
            metrics,
            client: reqwest::Client::new(),
            cancel_token,
            _handle: handle,
        })
    }

    /// Get the base URL of the test server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get the socket address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Get reference to the server configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the server's metrics registry.
    pub fn metrics(&self) -> &Arc<GoappMetrics> {
        &self.metrics
    }

    /// Issue a GET request against `path`.
    pub async fn get(&self, path: &str) -> Result<reqwest::Response, anyhow::Error> {
        Ok(self.client.get(format!("{}{}", self.url(), path)).send().await?)
    }

    /// Fetch and parse `/metrics`.
    pub async fn scrape(&self) -> Result<Scrape, anyhow::Error> {
        let response = self.get("/metrics").await?;
        if !response.status().is_success() {
            anyhow::bail!("Metrics endpoint returned status: {}", response.status());
        }
        Ok(Scrape::parse(&response.text().await?)?)
    }
}

impl Drop for TestGoappServer {
    fn drop(&mut self) {
        // Stop background tasks and abort the HTTP server task so nothing
        // outlives the test
        self.cancel_token.cancel();
        self._handle.abort();
    }
}
