//! Download coordination: probe, plan, dispatch, and aggregate.

use std::path::Path;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::DownloadConfig;
use crate::error::{DownloadError, DownloadResult};
use crate::http::{HttpSource, RemoteSource};
use crate::progress::{ProgressSnapshot, ProgressTracker};
use crate::state::{DownloadJob, JobReport};
use crate::strategy::{DownloadStrategy, MultiRangeStrategy, SingleStreamStrategy};
use crate::writer;

/// Callback invoked with each progress snapshot.
pub type ProgressCallback = Box<dyn Fn(&ProgressSnapshot) + Send + Sync>;

/// Coordinates one download from probe to completion.
///
/// The coordinator probes the resource, pre-sizes the destination, picks a
/// strategy based on the probe, supervises the parallel tasks, and turns
/// the per-task outcomes into one aggregate result. A failing task never
/// aborts its siblings; failures surface together once every task has
/// finished.
pub struct Downloader {
    source: Arc<dyn RemoteSource>,
    config: DownloadConfig,
}

impl Downloader {
    /// Create a downloader using a real HTTP source.
    pub fn new(config: DownloadConfig) -> Self {
        let source = Arc::new(HttpSource::with_timeout(config.timeout));
        Self { source, config }
    }

    /// Create a downloader with an injected source (used by tests).
    pub fn with_source(source: Arc<dyn RemoteSource>, config: DownloadConfig) -> Self {
        Self { source, config }
    }

    /// Run the download to completion.
    ///
    /// Blocks until every task has finished, then returns the aggregate
    /// outcome: `Ok` with the report when all ranges landed,
    /// [`DownloadError::RangesFailed`] naming every failed range, or
    /// [`DownloadError::Cancelled`] when `cancel` fired.
    pub fn run(
        &self,
        url: &str,
        dest: &Path,
        cancel: &CancellationToken,
        on_progress: Option<ProgressCallback>,
    ) -> DownloadResult<JobReport> {
        self.config.validate()?;

        info!(url, "probing remote resource");
        let probe = self.source.probe(url)?;
        debug!(
            content_length = probe.content_length,
            accept_ranges = probe.accept_ranges,
            "probe complete"
        );

        let job = DownloadJob::new(url, dest.to_path_buf(), probe, self.config.workers);
        writer::prepare_destination(&job.dest, job.content_length)?;

        let total_tasks = if job.single_stream() { 1 } else { job.workers };
        let (done_tx, done_rx) = mpsc::channel();

        // The tracker runs on its own thread so task completions are
        // rendered as they arrive; it ends with the 100% snapshot.
        let reporter = on_progress.map(|callback| {
            let tracker = ProgressTracker::new(total_tasks, done_rx);
            thread::spawn(move || {
                for snapshot in tracker {
                    callback(&snapshot);
                }
            })
        });

        let report = if job.single_stream() {
            info!(
                url = %job.url,
                "downloading as a single stream (no range support or unknown length)"
            );
            SingleStreamStrategy.execute(&job, &self.source, &done_tx, cancel)
        } else {
            info!(
                url = %job.url,
                workers = job.workers,
                max_in_flight = self.config.max_in_flight(),
                "downloading with ranged requests"
            );
            MultiRangeStrategy::new(self.config.max_in_flight())
                .execute(&job, &self.source, &done_tx, cancel)
        };

        drop(done_tx);
        if let Some(handle) = reporter {
            let _ = handle.join();
        }

        if cancel.is_cancelled() {
            return Err(DownloadError::Cancelled);
        }
        if report.has_failures() {
            return Err(DownloadError::RangesFailed {
                failed: report.failed.clone(),
            });
        }

        info!(
            url = %job.url,
            bytes = report.bytes_written,
            tasks = report.total_tasks,
            "download complete"
        );
        Ok(report)
    }
}
