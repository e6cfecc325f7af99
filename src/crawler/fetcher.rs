//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with the configured user agent and timeout
//! - Throttled GET requests for pages and binary resources
//! - Error classification (network vs. HTTP status)
//!
//! The fetcher knows nothing about crawl state. Each URL gets exactly one
//! attempt; the caller decides what a failure means.

use crate::config::Config;
use crate::crawler::throttle::RequestThrottle;
use crate::FetchError;
use reqwest::{header::CONTENT_TYPE, redirect::Policy, Client};
use std::time::Duration;
use url::Url;

/// Maximum number of redirects followed for a single request
const MAX_REDIRECTS: usize = 10;

/// A successfully retrieved response body
#[derive(Debug, Clone)]
pub struct FetchedResource {
    /// Final URL after redirects
    pub final_url: Url,

    /// HTTP status code
    pub status_code: u16,

    /// Content-Type header value
    pub content_type: Option<String>,

    /// Raw body bytes
    pub body: Vec<u8>,
}

impl FetchedResource {
    /// Returns true if the response declares an HTML body
    ///
    /// A missing Content-Type is treated as HTML, which matches how browsers
    /// sniff typical pages.
    pub fn is_html(&self) -> bool {
        match &self.content_type {
            Some(ct) => {
                let ct = ct.to_ascii_lowercase();
                ct.contains("text/html") || ct.contains("application/xhtml")
            }
            None => true,
        }
    }

    /// Body decoded as UTF-8, replacing invalid sequences
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use utsushi::config::Config;
/// use utsushi::crawler::build_http_client;
///
/// let client = build_http_client(&Config::default()).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    let timeout = Duration::from_secs(config.crawler.request_timeout_seconds);

    Client::builder()
        .user_agent(config.user_agent.header_value())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Rate-limited HTTP retrieval shared by the frontier and the mirror writer
#[derive(Debug)]
pub struct Fetcher {
    client: Client,
    throttle: RequestThrottle,
}

impl Fetcher {
    /// Creates a fetcher from an existing client and throttle
    pub fn new(client: Client, throttle: RequestThrottle) -> Self {
        Self { client, throttle }
    }

    /// Creates a fetcher configured from the crawler settings
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let client = build_http_client(config)?;
        let throttle = RequestThrottle::from_secs_f64(config.crawler.delay_seconds);
        Ok(Self::new(client, throttle))
    }

    /// Fetches a URL with a single attempt
    ///
    /// # Error Classification
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | 2xx/3xx (after redirects) | `Ok(FetchedResource)` |
    /// | 4xx/5xx | `FetchError::Http { status }` |
    /// | Timeout | `FetchError::Network { timed_out: true }` |
    /// | Connection/TLS/DNS/redirect failure | `FetchError::Network` |
    /// | Body read failure | `FetchError::Network` |
    pub async fn fetch(&self, url: &Url) -> Result<FetchedResource, FetchError> {
        self.throttle.acquire().await;
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify_error(url, &e))?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(FetchError::Http {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response
            .bytes()
            .await
            .map_err(|e| classify_error(url, &e))?;

        Ok(FetchedResource {
            final_url,
            status_code: status.as_u16(),
            content_type,
            body: body.to_vec(),
        })
    }
}

/// Maps a reqwest error onto the crawl's error taxonomy
fn classify_error(url: &Url, error: &reqwest::Error) -> FetchError {
    let message = if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        format!("Connection failed: {}", error)
    } else if error.is_redirect() {
        format!("Redirect error: {}", error)
    } else {
        error.to_string()
    };

    FetchError::Network {
        url: url.to_string(),
        message,
        timed_out: error.is_timeout(),
    }
}
