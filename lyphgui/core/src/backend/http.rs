//! HTTP Lyph Service
//!
//! [`LyphService`] over plain HTTP GET using `reqwest`.
//!
//! The lyph server speaks a tiny REST dialect: every operation is a GET with
//! query parameters, answering either JSON (with an `Error` field on failure)
//! or preformatted text.

use std::time::Duration;

use async_trait::async_trait;

use super::traits::{LyphService, ServiceConfig, TransportError};

/// Upper bound for the reachability probe, independent of the request timeout
const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP client for the lyph server
#[derive(Clone, Debug)]
pub struct HttpService {
    /// Base URL without trailing slash
    base_url: String,
    /// HTTP client
    http_client: reqwest::Client,
}

impl HttpService {
    /// Create a client for `base_url` with a per-request timeout
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Connection`] if the HTTP client cannot be
    /// constructed (e.g. TLS backend initialisation failure).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
        })
    }

    /// Create from a [`ServiceConfig`]
    ///
    /// # Errors
    ///
    /// See [`HttpService::new`].
    pub fn from_config(config: &ServiceConfig) -> Result<Self, TransportError> {
        Self::new(config.base_url.clone(), config.timeout)
    }

    /// Base URL requests are issued against
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for a request path
    fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

#[async_trait]
impl LyphService for HttpService {
    fn name(&self) -> &str {
        "HTTP"
    }

    async fn fetch(&self, path: &str) -> Result<String, TransportError> {
        let url = self.url_for(path);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                code: status.as_u16(),
                body,
            });
        }

        response
            .text()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))
    }

    /// HEAD on the base URL; any HTTP answer counts as reachable
    async fn health_check(&self) -> bool {
        self.http_client
            .head(&self.base_url)
            .timeout(HEALTH_CHECK_TIMEOUT)
            .send()
            .await
            .is_ok()
    }
}
