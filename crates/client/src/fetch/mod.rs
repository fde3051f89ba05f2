//! Network access for the worker.
//!
//! ### Network seam
//! - Strategies only talk to the [`Network`] trait, so tests can drive them
//!   with in-process fakes (including ones that never resolve).
//!
//! ### HTTP fetcher
//! - [`FetchClient`] is the reqwest-backed implementation.
//! - Non-success statuses are returned as responses, not errors. Only
//!   transport failures (DNS, connect, timeout, body read) are `Err`.
//! - `no-store` and `reload` requests send `Cache-Control: no-cache` and
//!   `Pragma: no-cache` so no intermediate HTTP cache answers them.

pub mod url;

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{self, HeaderValue};
use reqwest::{Client, Method};

pub use self::url::{UrlError, resolve};

use crate::request::{Request, Response};
use roam_core::Error;

/// Something that can perform a fetch for the worker.
#[async_trait]
pub trait Network: Send + Sync {
    /// Perform the request.
    ///
    /// Returns `Err(Error::Network)` only when no response was received.
    async fn fetch(&self, request: &Request) -> Result<Response, Error>;
}

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "roam-sw/0.1")
    pub user_agent: String,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_body_bytes: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "roam-sw/0.1".to_string(),
            timeout: Duration::from_millis(20000),
            max_redirects: 5,
            max_body_bytes: 5 * 1024 * 1024,
        }
    }
}

impl From<&roam_core::WorkerConfig> for FetchConfig {
    fn from(config: &roam_core::WorkerConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            timeout: config.timeout(),
            max_body_bytes: config.max_body_bytes,
            ..Default::default()
        }
    }
}

/// reqwest-backed [`Network`].
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

#[async_trait]
impl Network for FetchClient {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        let start = Instant::now();

        let mut builder = self.http.request(request.method.clone(), request.url.as_str());
        if request.cache.bypasses_http_cache() {
            builder = builder
                .header(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"))
                .header(header::PRAGMA, HeaderValue::from_static("no-cache"));
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Network(format!("timeout fetching {}", request.url))
            } else {
                Error::Network(format!("network error: {}", e))
            }
        })?;

        let status = response.status();

        if let Some(len) = response.content_length()
            && len > self.config.max_body_bytes as u64
        {
            return Err(Error::Network(format!(
                "{} answered {} bytes, limit is {}",
                request.url, len, self.config.max_body_bytes
            )));
        }

        let headers = response.headers().clone();

        let body = if request.method == Method::HEAD {
            bytes::Bytes::new()
        } else {
            response
                .bytes()
                .await
                .map_err(|e| Error::Network(format!("failed to read response: {}", e)))?
        };

        if body.len() > self.config.max_body_bytes {
            return Err(Error::Network(format!(
                "{} answered {} bytes, limit is {}",
                request.url,
                body.len(),
                self.config.max_body_bytes
            )));
        }

        tracing::debug!(
            "fetched {} {} -> {} in {}ms ({} bytes)",
            request.method,
            request.url,
            status.as_u16(),
            start.elapsed().as_millis(),
            body.len()
        );

        Ok(Response::new(status, headers, body))
    }
}
