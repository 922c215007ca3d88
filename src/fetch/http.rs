// src/fetch/http.rs
// =============================================================================
// This module downloads pages over HTTP.
//
// Key functionality:
// - One GET request per URL, no retries
// - A single pooled reqwest client shared by every fetch in a crawl
// - Every failure mode (timeout, connection, non-2xx status, unreadable body)
//   becomes a typed FetchError that the crawler can log and move past
//
// The Fetcher trait is the seam between the crawl engine and the network.
// Tests plug in an in-memory implementation; the binary uses HttpFetcher.
// =============================================================================

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use url::Url;

// Why a single fetch failed.
//
// The crawler treats every variant the same way (log it, no links), but the
// variants stay distinct so a retry policy could tell them apart later.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request did not complete within the configured timeout
    #[error("request timed out")]
    Timeout,
    /// DNS resolution or the TCP/TLS connection failed
    #[error("connection failed: {0}")]
    Connect(String),
    /// The server answered with a non-2xx status
    #[error("HTTP {0}")]
    Status(u16),
    /// The response arrived but its body could not be read as text
    #[error("could not read response body: {0}")]
    Body(String),
    /// Any other transport failure (redirect loop, malformed response, ...)
    #[error("request failed: {0}")]
    Request(String),
}

// Anything that can turn a URL into an HTML body.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError>;
}

// Fetcher backed by reqwest.
//
// The client is built once and reused for every request (connection pooling).
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    // Builds the HTTP client
    //
    // Parameters:
    //   timeout: upper bound for a whole request, body included
    //   user_agent: value of the User-Agent header sent with every request
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(categorize_error)?;

        check_status(response.status())?;

        response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Body(e.to_string())
            }
        })
    }
}

// Only 2xx responses carry a page worth parsing.
// Redirects have already been followed by the client at this point.
fn check_status(status: StatusCode) -> Result<(), FetchError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(FetchError::Status(status.as_u16()))
    }
}

// Maps a reqwest error onto our own taxonomy
fn categorize_error(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout
    } else if error.is_connect() {
        FetchError::Connect(error.to_string())
    } else {
        FetchError::Request(error.to_string())
    }
}
