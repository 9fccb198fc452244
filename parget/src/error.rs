//! Error types for the download engine.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::range::ByteRange;

/// Result type for download operations.
pub type DownloadResult<T> = Result<T, DownloadError>;

/// Errors that can occur while probing, fetching, or writing a download.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The capability probe against the target URL failed.
    #[error("failed to probe {url}: {reason}")]
    Probe { url: String, reason: String },

    /// The download configuration is invalid.
    #[error("invalid download configuration: {0}")]
    InvalidConfig(String),

    /// The download URL could not be parsed or is unusable.
    #[error("invalid download URL: {0}")]
    InvalidUrl(String),

    /// A request could not be completed at the transport level.
    #[error("request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    /// The server answered with a non-success status code.
    #[error("{url} returned HTTP status {status}")]
    Status { url: String, status: u16 },

    /// The response body could not be read to completion.
    #[error("failed to read response body from {url}: {reason}")]
    BodyRead { url: String, reason: String },

    /// The destination file could not be created or pre-sized.
    #[error("failed to create {}: {source}", .path.display())]
    Create { path: PathBuf, source: io::Error },

    /// A positional write to the destination file failed.
    #[error("failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },

    /// One or more ranges failed after all tasks finished.
    ///
    /// Successfully written regions are left intact; the listed ranges are
    /// missing or incomplete in the destination file.
    #[error("{} range(s) failed to download: {}", .failed.len(), summarize(.failed))]
    RangesFailed { failed: Vec<RangeFailure> },

    /// The download was cancelled before it completed.
    #[error("download cancelled")]
    Cancelled,
}

/// A single range that failed, with the reason it failed.
#[derive(Debug, Clone)]
pub struct RangeFailure {
    /// The byte range assigned to the failed task.
    pub range: ByteRange,
    /// Rendered failure reason.
    pub reason: String,
}

impl std::fmt::Display for RangeFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.range, self.reason)
    }
}

fn summarize(failed: &[RangeFailure]) -> String {
    failed
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
