//! # goapp Test Utilities
//!
//! Shared test utilities for the goapp service.
//!
//! This crate provides:
//! - Server test harness (`TestGoappServer` for E2E tests)
//! - Prometheus text exposition parsing (`Scrape`)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use goapp_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> Result<(), anyhow::Error> {
//!     let server = TestGoappServer::spawn().await?;
//!
//!     let response = server.get("/").await?;
//!     assert_eq!(response.status(), 200);
//!
//!     let scrape = server.scrape().await?;
//!     assert_eq!(scrape.value("goapp_http_requests_total", &[]), Some(1.0));
//!     Ok(())
//! }
//! ```

pub mod exposition;
pub mod server_harness;

// Re-export commonly used items
pub use exposition::*;
pub use server_harness::*;
