use feed_rs::parser::{ParseErrorKind, ParseFeedError};
use futures::StreamExt;
use std::time::Duration;
use thiserror::Error;

use crate::article::RawArticleItem;
use crate::feed::parser::parse_feed;
use crate::util::{validate_url, UrlValidationError};

/// Default per-request timeout, covering connect, headers and body.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Default response size limit.
pub const DEFAULT_MAX_FEED_BYTES: usize = 10 * 1024 * 1024; // 10MB

/// Errors that can occur while fetching a feed.
///
/// Every variant is a failed fetch that the caller sees. An empty feed is
/// not an error; it yields `Ok` with no items.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The configured feed URL is not a usable http(s) URL
    #[error("Invalid feed URL: {0}")]
    InvalidUrl(#[from] UrlValidationError),
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the configured timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    /// Feed XML could not be parsed as RSS or Atom
    #[error("Parse error: {0}")]
    Parse(String),
    /// Response body exceeded the size limit
    #[error("Response too large (limit {0} bytes)")]
    ResponseTooLarge(usize),
    /// Response was incomplete (received fewer bytes than Content-Length)
    #[error("Incomplete response: expected {expected} bytes, received {received}")]
    IncompleteResponse { expected: u64, received: usize },
}

/// Tunables for [`FeedFetcher`].
#[derive(Debug, Clone)]
pub struct FetcherSettings {
    pub timeout: Duration,
    pub max_feed_bytes: usize,
    pub user_agent: String,
}

impl Default for FetcherSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_feed_bytes: DEFAULT_MAX_FEED_BYTES,
            user_agent: concat!("articlesync/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Retrieves feeds over HTTP and parses them into [`RawArticleItem`]s.
///
/// Holds one `reqwest::Client`, so connections are pooled across feeds.
/// There is no retry or backoff: each failure is returned as is.
#[derive(Clone)]
pub struct FeedFetcher {
    client: reqwest::Client,
    settings: FetcherSettings,
}

impl FeedFetcher {
    /// Builds a fetcher with its own HTTP client.
    pub fn new(settings: FetcherSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.as_str())
            .build()?;
        Ok(Self::with_client(client, settings))
    }

    /// Builds a fetcher around an existing client (custom TLS, proxies, tests).
    pub fn with_client(client: reqwest::Client, settings: FetcherSettings) -> Self {
        Self { client, settings }
    }

    /// Fetches `feed_url` and returns its items in feed order.
    ///
    /// `source_label` is only used to attribute log lines.
    ///
    /// # Errors
    ///
    /// - [`FetchError::InvalidUrl`] - `feed_url` is not an http(s) URL
    /// - [`FetchError::Network`] - connection or TLS errors
    /// - [`FetchError::Timeout`] - the request exceeded the configured timeout
    /// - [`FetchError::HttpStatus`] - non-2xx response
    /// - [`FetchError::ResponseTooLarge`] / [`FetchError::IncompleteResponse`] - body problems
    /// - [`FetchError::Parse`] - the body is not a feed
    ///
    /// An empty body, a feed root without an item list, or a feed with zero
    /// items is logged as a warning and returns `Ok(vec![])`.
    pub async fn fetch(
        &self,
        source_label: &str,
        feed_url: &str,
    ) -> Result<Vec<RawArticleItem>, FetchError> {
        let url = validate_url(feed_url)?;

        let bytes = tokio::time::timeout(self.settings.timeout, self.download(url))
            .await
            .map_err(|_| FetchError::Timeout(self.settings.timeout))??;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            tracing::warn!(source = %source_label, feed = %feed_url, "Feed returned no content");
            return Ok(Vec::new());
        }

        let items = match parse_feed(&bytes) {
            Ok(items) => items,
            // Well-formed document whose root carries no item list
            Err(ParseFeedError::ParseError(ParseErrorKind::NoFeedRoot)) => {
                tracing::warn!(source = %source_label, feed = %feed_url, "Feed contains no item list");
                return Ok(Vec::new());
            }
            Err(e) => return Err(FetchError::Parse(e.to_string())),
        };

        if items.is_empty() {
            tracing::warn!(source = %source_label, feed = %feed_url, "Feed contains no items");
        } else {
            tracing::debug!(
                source = %source_label,
                feed = %feed_url,
                items = items.len(),
                "Fetched feed"
            );
        }

        Ok(items)
    }

    async fn download(&self, url: url::Url) -> Result<Vec<u8>, FetchError> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::HttpStatus(response.status().as_u16()));
        }

        read_limited_bytes(response, self.settings.max_feed_bytes).await
    }
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    let expected_length = response.content_length();

    // Fast path: check Content-Length header
    if let Some(len) = expected_length {
        if len > limit as u64 {
            return Err(FetchError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    if let Some(expected) = expected_length {
        if (bytes.len() as u64) < expected {
            return Err(FetchError::IncompleteResponse {
                expected,
                received: bytes.len(),
            });
        }
    }

    Ok(bytes)
}
