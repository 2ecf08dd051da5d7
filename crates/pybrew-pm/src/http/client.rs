//! HTTP client for package index and download requests.
//!
//! This module provides a thin wrapper around the blocking `reqwest` client:
//! - Custom User-Agent header
//! - Connect and read timeouts
//! - Optional proxy
//!
//! Requests are issued one at a time and are never retried. Non-success
//! statuses are returned to the caller, which decides what they mean
//! (a missing index page and a failed download map to different errors).
//!
//! # Examples
//!
//! ```no_run
//! use pybrew_pm::http::{HttpClient, HttpClientConfig, Transport};
//! use std::time::Duration;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HttpClientConfig::new().with_timeout(Duration::from_secs(60));
//! let client = HttpClient::with_config(config)?;
//!
//! let response = client.get("https://pypi.org/simple/requests/")?;
//! println!("HTTP {} ({} bytes)", response.status, response.body.len());
//! # Ok(())
//! # }
//! ```

use reqwest::blocking::Client;
use std::time::{Duration, Instant};
use thiserror::Error;

const DEFAULT_USER_AGENT: &str = concat!("pybrew/", env!("CARGO_PKG_VERSION"));
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Transport error for {url}: {reason}")]
    Transport { url: String, reason: String },
}

/// A fully buffered response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Statuses of 300 and above count as failures.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Anything able to perform a GET and hand back the whole body.
///
/// The locator and the hash fetcher only talk to this trait, so tests can
/// serve canned listings without network access.
pub trait Transport {
    fn get(&self, url: &str) -> Result<HttpResponse, HttpError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, url: &str) -> Result<HttpResponse, HttpError> {
        (**self).get(url)
    }
}

#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    user_agent: String,
}

impl HttpClient {
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_config(HttpClientConfig::default())
    }

    pub fn with_config(config: HttpClientConfig) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .gzip(true)
            .user_agent(&config.user_agent);

        if let Some(proxy_url) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy_url)?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build()?;

        Ok(Self {
            client,
            user_agent: config.user_agent,
        })
    }

    /// Get the configured user agent
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

impl Transport for HttpClient {
    fn get(&self, url: &str) -> Result<HttpResponse, HttpError> {
        log::debug!("HTTP GET {}", url);
        let start = Instant::now();

        let response = self.client.get(url).send()?;
        let status = response.status().as_u16();
        let body = response.bytes()?.to_vec();

        log::debug!(
            "HTTP {} {} ({} bytes) in {:?}",
            status,
            url,
            body.len(),
            start.elapsed()
        );

        Ok(HttpResponse { status, body })
    }
}

#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub proxy: Option<String>,
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            proxy: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl HttpClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    pub fn with_proxy(mut self, proxy: String) -> Self {
        self.proxy = Some(proxy);
        self
    }

    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }
}
