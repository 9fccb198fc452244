//! Configuration for the downloader.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::{DownloadError, DownloadResult};

/// Default number of download workers.
pub const DEFAULT_WORKERS: usize = 6;

/// Default HTTP request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Configuration for a download.
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// Number of workers, which is also the number of ranges the file is
    /// split into.
    pub workers: usize,

    /// Upper bound on concurrently running tasks.
    ///
    /// `None` means one in-flight task per worker. Setting a lower bound
    /// keeps a large worker count from opening that many connections at
    /// once.
    pub max_in_flight: Option<usize>,

    /// HTTP request timeout.
    pub timeout: Duration,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            max_in_flight: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl DownloadConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the worker count.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Bound the number of concurrently running tasks.
    pub fn with_max_in_flight(mut self, max: usize) -> Self {
        self.max_in_flight = Some(max);
        self
    }

    /// Set the HTTP request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Effective in-flight bound.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.unwrap_or(self.workers)
    }

    /// Reject configurations the planner cannot work with.
    pub fn validate(&self) -> DownloadResult<()> {
        if self.workers == 0 {
            return Err(DownloadError::InvalidConfig(
                "worker count must be at least 1".to_string(),
            ));
        }
        if self.max_in_flight == Some(0) {
            return Err(DownloadError::InvalidConfig(
                "max in-flight tasks must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Derive the destination file name from the URL's final path segment.
///
/// The URL must be an absolute http(s) URI whose path names a file;
/// anything else is rejected rather than producing a surprise file name.
pub fn destination_from_url(url: &str) -> DownloadResult<PathBuf> {
    let parsed =
        Url::parse(url).map_err(|e| DownloadError::InvalidUrl(format!("{}: {}", url, e)))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(DownloadError::InvalidUrl(format!(
            "unsupported scheme '{}'",
            parsed.scheme()
        )));
    }

    parsed
        .path_segments()
        .and_then(|segments| {
            segments
                .filter(|s| !s.is_empty())
                .last()
                .map(|name| PathBuf::from(name.to_string()))
        })
        .ok_or_else(|| {
            DownloadError::InvalidUrl(format!("no file name in URL path: {}", url))
        })
}

/// Format a byte count in human-readable form.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", bytes, UNITS[unit])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}
