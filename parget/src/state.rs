//! Per-job state: the immutable job description and the outcome report.

use std::path::PathBuf;

use crate::error::RangeFailure;
use crate::http::ResourceInfo;

/// One download job, fixed at creation from the probe results.
#[derive(Debug, Clone)]
pub struct DownloadJob {
    /// Source URL.
    pub url: String,
    /// Destination path on the local filesystem.
    pub dest: PathBuf,
    /// Total content length in bytes; 0 when the server did not report one.
    pub content_length: u64,
    /// Whether the server advertises byte-range support.
    pub accept_ranges: bool,
    /// Requested number of workers (ranges).
    pub workers: usize,
}

impl DownloadJob {
    /// Build a job from probe results.
    pub fn new(url: impl Into<String>, dest: PathBuf, info: ResourceInfo, workers: usize) -> Self {
        Self {
            url: url.into(),
            dest,
            content_length: info.content_length,
            accept_ranges: info.accept_ranges,
            workers,
        }
    }

    /// True when the job must be downloaded as one unranged stream.
    ///
    /// That is the case when the server does not support ranges, or when the
    /// content length is unknown and there is nothing to partition.
    pub fn single_stream(&self) -> bool {
        !self.accept_ranges || self.content_length == 0
    }
}

/// Aggregated outcome of all tasks of one job.
#[derive(Debug, Clone, Default)]
pub struct JobReport {
    /// Total number of tasks dispatched.
    pub total_tasks: usize,
    /// Tasks that finished, successfully or not.
    pub completed: usize,
    /// Tasks that finished successfully.
    pub succeeded: usize,
    /// Bytes written to the destination by successful tasks.
    pub bytes_written: u64,
    /// Ranges whose task failed, with reasons.
    pub failed: Vec<RangeFailure>,
}

impl JobReport {
    /// Create an empty report expecting `total_tasks` outcomes.
    pub fn new(total_tasks: usize) -> Self {
        Self {
            total_tasks,
            ..Self::default()
        }
    }

    /// Record one successful task that wrote `bytes` bytes.
    pub fn record_success(&mut self, bytes: u64) {
        self.completed += 1;
        self.succeeded += 1;
        self.bytes_written += bytes;
    }

    /// Record one failed task.
    pub fn record_failure(&mut self, failure: RangeFailure) {
        self.completed += 1;
        self.failed.push(failure);
    }

    /// True once every task has reported an outcome.
    pub fn is_complete(&self) -> bool {
        self.completed == self.total_tasks
    }

    /// True when any task failed.
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    /// Number of failed tasks.
    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }
}
