//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with a proper user agent string
//! - GET requests returning the raw response body
//! - Classifying failures into the categories the error classifier acts on

use crate::config::UserAgentConfig;
use reqwest::header::REFERER;
use reqwest::Client;
use std::error::Error as StdError;
use std::time::Duration;
use thiserror::Error;

/// A failed fetch, classified by cause
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchFailure {
    /// The server answered with a non-success status
    #[error("HTTP {status} from {url}")]
    HttpStatus {
        status: u16,
        /// Final URL of the response, after redirects
        url: String,
    },

    #[error("DNS lookup failed for {url}")]
    Dns { url: String },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Request to {url} failed: {message}")]
    Other { url: String, message: String },
}

impl FetchFailure {
    /// Category label: `HTTP_STATUS`, `DNS_FAILURE`, `TIMEOUT` or `OTHER`
    pub fn category(&self) -> &'static str {
        match self {
            Self::HttpStatus { .. } => "HTTP_STATUS",
            Self::Dns { .. } => "DNS_FAILURE",
            Self::Timeout { .. } => "TIMEOUT",
            Self::Other { .. } => "OTHER",
        }
    }

    /// The URL the failure is about
    pub fn url(&self) -> &str {
        match self {
            Self::HttpStatus { url, .. }
            | Self::Dns { url }
            | Self::Timeout { url }
            | Self::Other { url, .. } => url,
        }
    }
}

/// A successful response
#[derive(Debug, Clone)]
pub struct Fetched {
    /// Final URL after redirects
    pub final_url: String,

    /// Response body, untouched
    pub body: Vec<u8>,
}

/// Builds an HTTP client with proper configuration
///
/// The timeout applies per request; a request that exceeds it fails with
/// `FetchFailure::Timeout` and is not retried.
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10).min(timeout))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Issues GET requests and classifies their failures
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Fetches `url`, optionally sending a Referer header
    ///
    /// Any non-success status is a failure; the body of an error response is
    /// discarded.
    pub async fn get(&self, url: &str, referer: Option<&str>) -> Result<Fetched, FetchFailure> {
        let mut request = self.client.get(url);
        if let Some(referer) = referer {
            request = request.header(REFERER, referer);
        }

        let response = request.send().await.map_err(|e| classify_error(url, &e))?;

        let status = response.status();
        let final_url = response.url().to_string();

        if !status.is_success() {
            return Err(FetchFailure::HttpStatus {
                status: status.as_u16(),
                url: final_url,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| classify_error(&final_url, &e))?;

        Ok(Fetched {
            final_url,
            body: body.to_vec(),
        })
    }
}

/// Maps a transport error onto a failure category
fn classify_error(url: &str, error: &reqwest::Error) -> FetchFailure {
    if error.is_timeout() {
        FetchFailure::Timeout {
            url: url.to_string(),
        }
    } else if is_dns_failure(error) {
        FetchFailure::Dns {
            url: url.to_string(),
        }
    } else {
        FetchFailure::Other {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

/// Walks the source chain looking for a resolver error
fn is_dns_failure(error: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(error);
    while let Some(err) = current {
        let message = err.to_string().to_lowercase();
        if message.contains("dns error")
            || message.contains("failed to lookup address")
            || message.contains("name or service not known")
            || message.contains("no such host")
            || message.contains("name resolution")
        {
            return true;
        }
        current = err.source();
    }
    false
}
