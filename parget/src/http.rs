//! HTTP access to the remote resource.
//!
//! The [`RemoteSource`] trait is the seam between the download engine and
//! the network: probing capabilities, fetching one byte range, and fetching
//! a whole body. [`HttpSource`] is the real implementation over a blocking
//! reqwest client; tests inject a mock instead.

use std::time::Duration;

use reqwest::blocking::Client;

use crate::error::{DownloadError, DownloadResult};
use crate::range::ByteRange;

/// Client identity sent with every request.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/99.0.4844.82 Safari/537.36";

/// Default timeout for HTTP requests in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 300; // 5 minutes

/// Capabilities of a remote resource, learned from the probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceInfo {
    /// Total size in bytes, or 0 when the server did not report one.
    pub content_length: u64,
    /// Whether the server advertises `Accept-Ranges: bytes`.
    pub accept_ranges: bool,
}

/// Access to a remote resource.
///
/// This abstraction allows dependency injection: the engine is exercised in
/// tests against an in-memory source instead of the network.
pub trait RemoteSource: Send + Sync {
    /// Probe the resource for its size and range support.
    fn probe(&self, url: &str) -> DownloadResult<ResourceInfo>;

    /// Fetch exactly the bytes covered by `range`.
    ///
    /// `range` must be non-empty; empty ranges are filtered out before any
    /// request is issued.
    fn fetch_range(&self, url: &str, range: ByteRange) -> DownloadResult<Vec<u8>>;

    /// Fetch the entire body with an unranged request.
    fn fetch_all(&self, url: &str) -> DownloadResult<Vec<u8>>;
}

/// Real remote source backed by a blocking reqwest client.
#[derive(Debug)]
pub struct HttpSource {
    client: Client,
}

impl Default for HttpSource {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpSource {
    /// Create a source with the default request timeout.
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a source with a custom request timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }
}

impl RemoteSource for HttpSource {
    fn probe(&self, url: &str) -> DownloadResult<ResourceInfo> {
        let response = self
            .client
            .head(url)
            .send()
            .map_err(|e| DownloadError::Probe {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Probe {
                url: url.to_string(),
                reason: format!("HEAD request failed with status {}", status),
            });
        }

        let content_length = response
            .headers()
            .get("content-length")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(0);

        let accept_ranges = response
            .headers()
            .get("accept-ranges")
            .map(|v| v.to_str().unwrap_or("") == "bytes")
            .unwrap_or(false);

        Ok(ResourceInfo {
            content_length,
            accept_ranges,
        })
    }

    fn fetch_range(&self, url: &str, range: ByteRange) -> DownloadResult<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .header("Range", range.header_value())
            .send()
            .map_err(|e| DownloadError::Request {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        // 206 Partial Content is the expected answer; a plain 200 means the
        // server ignored the Range header but still counts as success.
        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| DownloadError::BodyRead {
                url: url.to_string(),
                reason: e.to_string(),
            })
    }

    fn fetch_all(&self, url: &str) -> DownloadResult<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| DownloadError::Request {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| DownloadError::BodyRead {
                url: url.to_string(),
                reason: e.to_string(),
            })
    }
}
