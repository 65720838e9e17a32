//! Lyph Service Traits
//!
//! Trait definition for the remote lyph service. The Composer only needs one
//! capability from the server, "GET this path and give me the body", so the
//! abstraction is small. Tests swap in scripted in-memory services.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Default lyph server port
pub const DEFAULT_PORT: u16 = 5052;

/// Failure to obtain a successful response body
#[derive(Debug, Error)]
pub enum TransportError {
    /// Server answered with a non-success status
    #[error("Server returned {code}: {body}")]
    Status {
        /// HTTP status code
        code: u16,
        /// Response body (may be empty)
        body: String,
    },
    /// Could not reach the server or the request failed in flight
    #[error("Connection failed: {0}")]
    Connection(String),
    /// Response arrived but its body could not be read
    #[error("Failed to read response body: {0}")]
    Body(String),
}

/// Connection settings for the lyph service
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Base URL, e.g. `http://localhost:5052`
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: format!("http://localhost:{DEFAULT_PORT}"),
            timeout: Duration::from_secs(30),
        }
    }
}

impl ServiceConfig {
    /// Create a configuration for a base URL with the default timeout
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// The remote lyph service
///
/// Implement this trait to point the Composer at a different transport.
#[async_trait]
pub trait LyphService: Send + Sync {
    /// Service name for logs
    fn name(&self) -> &str;

    /// Issue an unauthenticated GET for `path` (which includes the query string)
    ///
    /// Returns the body of a successful response. Non-success statuses and
    /// connection failures are errors; no retry is attempted.
    async fn fetch(&self, path: &str) -> Result<String, TransportError>;

    /// Check if the service is reachable
    ///
    /// Must stay cheap: surfaces call it on startup.
    async fn health_check(&self) -> bool;
}
