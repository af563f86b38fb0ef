//! HTTP transport for WebDAV requests
//!
//! The [`HttpTransport`] trait is the seam between the WebDAV client logic
//! and the actual network stack, so tests can drive the client with a mock
//! transport. [`ReqwestTransport`] is the production implementation.

use crate::error::{Result, WebDavError};
use async_trait::async_trait;
use bytes::Bytes;
use core_runtime::config::WebDavSettings;
use reqwest::{Method, StatusCode};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Connect timeout for the underlying HTTP client
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Overall per-request cutoff
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Maximum attempts per request, including the first
const MAX_RETRIES: u32 = 3;

/// User agent sent with every request
const USER_AGENT: &str = concat!("reference-library-core/", env!("CARGO_PKG_VERSION"));

/// Minimal HTTP surface the WebDAV client needs
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Fetch the body at `url`
    async fn get(&self, url: &str) -> Result<Bytes>;

    /// Probe whether the resource at `url` exists (PROPFIND, depth 0)
    async fn exists(&self, url: &str) -> Result<bool>;
}

/// Production transport backed by `reqwest` with basic auth and retry
///
/// Rate limits (429) and server errors (5xx) are retried with exponential
/// backoff; client errors are returned immediately.
pub struct ReqwestTransport {
    client: reqwest::Client,
    username: String,
    password: String,
}

impl ReqwestTransport {
    /// Build a transport from the remote mirror settings
    pub fn new(settings: &WebDavSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| WebDavError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            username: settings.username.clone(),
            password: settings.password.clone(),
        })
    }

    /// Execute a request, retrying rate limits, server errors, and network
    /// faults with exponential backoff. Any other status is handed back to
    /// the caller to interpret.
    #[instrument(skip(self), fields(url = %url))]
    async fn execute_with_retry(
        &self,
        method: Method,
        url: &str,
        depth: Option<&str>,
    ) -> Result<reqwest::Response> {
        let mut attempt = 0;

        loop {
            let mut request = self
                .client
                .request(method.clone(), url)
                .basic_auth(&self.username, Some(&self.password));
            if let Some(depth) = depth {
                request = request.header("Depth", depth);
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status();

                    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                        attempt += 1;
                        if attempt >= MAX_RETRIES {
                            warn!(
                                "WebDAV request failed after {} attempts: status={}",
                                MAX_RETRIES, status
                            );
                            return Err(WebDavError::Http {
                                status: status.as_u16(),
                                message: format!("request failed after {} retries", MAX_RETRIES),
                            });
                        }

                        let backoff_ms = 100u64 * 2u64.pow(attempt);
                        warn!(
                            "WebDAV request failed (attempt {}/{}): status={}, retrying in {}ms",
                            attempt, MAX_RETRIES, status, backoff_ms
                        );
                        tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    } else {
                        debug!("WebDAV request completed: status={}", status);
                        return Ok(response);
                    }
                }
                Err(e) => {
                    attempt += 1;
                    if attempt >= MAX_RETRIES {
                        warn!("WebDAV request failed after {} attempts: {}", MAX_RETRIES, e);
                        return Err(WebDavError::Network(e.to_string()));
                    }

                    let backoff_ms = 100u64 * 2u64.pow(attempt);
                    warn!(
                        "WebDAV request failed (attempt {}/{}): {}, retrying in {}ms",
                        attempt, MAX_RETRIES, e, backoff_ms
                    );
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                }
            }
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<Bytes> {
        let response = self.execute_with_retry(Method::GET, url, None).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(WebDavError::Http {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string(),
            });
        }

        response
            .bytes()
            .await
            .map_err(|e| WebDavError::Network(e.to_string()))
    }

    async fn exists(&self, url: &str) -> Result<bool> {
        let method = Method::from_bytes(b"PROPFIND").expect("PROPFIND is a valid method");
        let response = self.execute_with_retry(method, url, Some("0")).await?;
        let status = response.status();

        // Multi-Status is the normal PROPFIND answer.
        if status.is_success() || status == StatusCode::MULTI_STATUS {
            return Ok(true);
        }
        if status == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        Err(WebDavError::Http {
            status: status.as_u16(),
            message: status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string(),
        })
    }
}
