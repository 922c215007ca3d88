// src/config.rs
// =============================================================================
// Run configuration for a crawl.
//
// A CrawlConfig is built once from the command line, validated, and never
// changed while the crawl runs. The three values that define a crawl are the
// base URL, the maximum depth and the delay between requests; the rest have
// defaults that reproduce a polite, sequential crawler.
// =============================================================================

use std::num::NonZeroUsize;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::extract::DEFAULT_CONTENT_MARKER;

pub const DEFAULT_MAX_DEPTH: usize = 3;
pub const DEFAULT_DELAY_SECS: f64 = 1.0;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_USER_AGENT: &str = concat!("news-crawler/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid base URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("base URL must use http or https, got '{0}'")]
    UnsupportedScheme(String),
    #[error("base URL has no host: {0}")]
    MissingHost(String),
    #[error("delay must be a finite, non-negative number of seconds, got {0}")]
    InvalidDelay(f64),
    #[error("concurrency must be at least 1")]
    ZeroConcurrency,
}

#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Where the crawl starts; root-relative links are resolved against it
    pub base_url: Url,
    /// Pages deeper than this many hops from the base are never fetched
    pub max_depth: usize,
    /// Minimum spacing between two fetches
    pub delay: Duration,
    /// URLs containing this substring produce content records
    pub content_marker: String,
    /// Upper bound on fetches in flight at once
    pub concurrency: NonZeroUsize,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl CrawlConfig {
    // Validates the three values every crawl needs and fills in defaults
    //
    // Parameters:
    //   base_url: absolute http(s) URL of the site
    //   max_depth: 0 = only the base page, 1 = base page + its links, ...
    //   delay_secs: seconds to wait between requests (fractions allowed)
    pub fn new(base_url: &str, max_depth: usize, delay_secs: f64) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            max_depth,
            delay: parse_delay(delay_secs)?,
            content_marker: DEFAULT_CONTENT_MARKER.to_string(),
            concurrency: NonZeroUsize::MIN,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        })
    }

    pub fn with_content_marker(mut self, marker: impl Into<String>) -> Self {
        self.content_marker = marker.into();
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Result<Self, ConfigError> {
        self.concurrency = NonZeroUsize::new(concurrency).ok_or(ConfigError::ZeroConcurrency)?;
        Ok(self)
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|source| ConfigError::InvalidUrl {
        url: raw.to_string(),
        source,
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::UnsupportedScheme(url.scheme().to_string()));
    }
    if url.host_str().is_none() {
        return Err(ConfigError::MissingHost(raw.to_string()));
    }

    Ok(url)
}

fn parse_delay(secs: f64) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(secs).map_err(|_| ConfigError::InvalidDelay(secs))
}
