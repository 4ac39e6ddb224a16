//! goapp service configuration.
//!
//! Configuration is loaded from environment variables. Every value has a
//! default, so an empty environment yields the stock demo setup on port 8081.

use std::collections::HashMap;
use std::env;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

/// Default HTTP bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8081";

/// Default period between online-users gauge refreshes, in milliseconds.
pub const DEFAULT_ONLINE_USERS_UPDATE_INTERVAL_MS: u64 = 500;

/// goapp service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP bind address (default: "0.0.0.0:8081").
    pub bind_address: SocketAddr,

    /// Period between background refreshes of the online-users gauge.
    pub online_users_update_interval: Duration,

    /// Optional per-request timeout. `None` means requests may run for as
    /// long as the handler takes (up to 5 seconds on `/contact`).
    pub request_timeout: Option<Duration>,

    /// Whether SIGINT/SIGTERM trigger a graceful shutdown.
    pub graceful_shutdown: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid bind address: {0}")]
    InvalidBindAddress(String),

    #[error("Invalid online users update interval: {0}")]
    InvalidUpdateInterval(String),

    #[error("Invalid request timeout: {0}")]
    InvalidRequestTimeout(String),

    #[error("Invalid graceful shutdown flag: {0}")]
    InvalidGracefulShutdown(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let bind_str = vars
            .get("BIND_ADDRESS")
            .map(String::as_str)
            .unwrap_or(DEFAULT_BIND_ADDRESS);
        let bind_address: SocketAddr = bind_str.parse().map_err(|e| {
            ConfigError::InvalidBindAddress(format!(
                "BIND_ADDRESS must be a valid socket address, got '{}': {}",
                bind_str, e
            ))
        })?;

        let update_interval_ms =
            if let Some(value_str) = vars.get("ONLINE_USERS_UPDATE_INTERVAL_MS") {
                let value: u64 = value_str.parse().map_err(|e| {
                    ConfigError::InvalidUpdateInterval(format!(
                        "ONLINE_USERS_UPDATE_INTERVAL_MS must be a valid positive integer, got '{}': {}",
                        value_str, e
                    ))
                })?;

                if value == 0 {
                    return Err(ConfigError::InvalidUpdateInterval(
                        "ONLINE_USERS_UPDATE_INTERVAL_MS must be greater than 0".to_string(),
                    ));
                }

                value
            } else {
                DEFAULT_ONLINE_USERS_UPDATE_INTERVAL_MS
            };

        // 0 is accepted as an explicit "no timeout"
        let request_timeout = match vars.get("REQUEST_TIMEOUT_SECONDS") {
            Some(value_str) => {
                let value: u64 = value_str.parse().map_err(|e| {
                    ConfigError::InvalidRequestTimeout(format!(
                        "REQUEST_TIMEOUT_SECONDS must be a valid non-negative integer, got '{}': {}",
                        value_str, e
                    ))
                })?;
                (value > 0).then(|| Duration::from_secs(value))
            }
            None => None,
        };

        let graceful_shutdown = match vars.get("GRACEFUL_SHUTDOWN").map(String::as_str) {
            None => false,
            Some("1") | Some("true") | Some("TRUE") | Some("yes") => true,
            Some("0") | Some("false") | Some("FALSE") | Some("no") => false,
            Some(other) => {
                return Err(ConfigError::InvalidGracefulShutdown(format!(
                    "GRACEFUL_SHUTDOWN must be true or false, got '{}'",
                    other
                )))
            }
        };

        Ok(Config {
            bind_address,
            online_users_update_interval: Duration::from_millis(update_interval_ms),
            request_timeout,
            graceful_shutdown,
        })
    }
}
