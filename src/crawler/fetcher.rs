//! HTTP fetcher implementation
//!
//! This module handles all page requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - Throttling consecutive page requests
//! - GET requests with a fixed timeout
//! - Classifying responses before their body is read
//! - Error classification

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::crawler::classifier::{Classification, Classifier};
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::Client;
use std::time::Duration;
use tokio::time::Instant;
use url::Url;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched an HTML page
    Page {
        /// Final URL after redirects
        final_url: Url,
        /// HTTP status code
        status_code: u16,
        /// Response headers
        headers: HeaderMap,
        /// Content-Type header value, if any
        content_type: Option<String>,
        /// Page body content
        body: String,
    },

    /// The response declares a downloadable content type; body not read
    Download {
        /// Final URL after redirects
        final_url: Url,
        /// The Content-Type received
        content_type: String,
    },

    /// Neither HTML nor a downloadable type; body not read
    Skipped {
        /// The Content-Type received
        content_type: String,
    },

    /// Non-2xx response
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, broken body, etc.)
    NetworkError {
        /// Error description
        error: String,
    },
}

impl FetchResult {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::HttpError { .. } | Self::NetworkError { .. })
    }
}

/// Enforces a minimum interval between consecutive requests
#[derive(Debug)]
pub struct Throttle {
    interval: Duration,
    last_request: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_request: None,
        }
    }

    /// Time left before the next request may go out
    pub fn time_until_ready(&self, now: Instant) -> Option<Duration> {
        let ready_at = self.last_request? + self.interval;
        (ready_at > now).then(|| ready_at - now)
    }

    /// Sleeps until the interval since the previous request has elapsed,
    /// then records the new request time
    pub async fn wait(&mut self) {
        if let Some(remaining) = self.time_until_ready(Instant::now()) {
            tracing::trace!("Throttling for {:?}", remaining);
            tokio::time::sleep(remaining).await;
        }
        self.last_request = Some(Instant::now());
    }
}

/// Builds an HTTP client with proper configuration
///
/// The client identifies itself with a fixed user agent, keeps no cookie
/// store, and follows up to 10 redirects. Per-request timeouts are applied by
/// the callers.
///
/// # Example
///
/// ```no_run
/// use trawler::config::UserAgentConfig;
/// use trawler::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .connect_timeout(Duration::from_secs(10))
        .redirect(reqwest::redirect::Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Rate-limited page fetcher
#[derive(Debug)]
pub struct Fetcher {
    client: Client,
    classifier: Classifier,
    timeout: Duration,
    throttle: Throttle,
}

impl Fetcher {
    pub fn new(client: Client, classifier: Classifier, config: &CrawlerConfig) -> Self {
        Self {
            client,
            classifier,
            timeout: config.request_timeout(),
            throttle: Throttle::new(config.politeness_delay()),
        }
    }

    /// Fetches a URL, waiting out the politeness interval first
    ///
    /// # Request Flow
    ///
    /// 1. Wait for the throttle
    /// 2. Send GET with the fixed timeout
    /// 3. Non-2xx → HttpError
    /// 4. Classify by URL and Content-Type
    ///    - Download → return without reading the body
    ///    - Skip → return without reading the body
    ///    - Page → read the body as text
    ///
    /// No retries: a failure is reported and the caller moves on.
    pub async fn fetch(&mut self, url: &Url) -> FetchResult {
        self.throttle.wait().await;

        let response = match self
            .client
            .get(url.as_str())
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return classify_error(&e),
        };

        let status = response.status();
        if !status.is_success() {
            return FetchResult::HttpError {
                status_code: status.as_u16(),
            };
        }

        let final_url = response.url().clone();
        let headers = response.headers().clone();
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        match self
            .classifier
            .classify(&final_url, content_type.as_deref())
        {
            Classification::Download => FetchResult::Download {
                final_url,
                content_type: content_type.unwrap_or_default(),
            },
            Classification::Skip => FetchResult::Skipped {
                content_type: content_type.unwrap_or_default(),
            },
            Classification::Page => match response.text().await {
                Ok(body) => FetchResult::Page {
                    final_url,
                    status_code: status.as_u16(),
                    headers,
                    content_type,
                    body,
                },
                Err(e) => classify_error(&e),
            },
        }
    }
}

fn classify_error(e: &reqwest::Error) -> FetchResult {
    let error = if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        "Connection refused".to_string()
    } else {
        e.to_string()
    };

    FetchResult::NetworkError { error }
}
