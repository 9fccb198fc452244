//! Download strategies: single unranged stream vs. parallel byte ranges.

use std::path::Path;
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{DownloadError, RangeFailure};
use crate::http::RemoteSource;
use crate::progress::TaskDone;
use crate::range::{split_ranges, ByteRange};
use crate::state::{DownloadJob, JobReport};
use crate::writer;

/// Strategy for transferring one job into the destination file.
///
/// A strategy never fails as a whole: each task's outcome lands in the
/// returned [`JobReport`] and the caller decides what the aggregate means.
pub trait DownloadStrategy: Send + Sync {
    /// Execute the transfer, sending exactly one [`TaskDone`] per task.
    fn execute(
        &self,
        job: &DownloadJob,
        source: &Arc<dyn RemoteSource>,
        done_tx: &Sender<TaskDone>,
        cancel: &CancellationToken,
    ) -> JobReport;
}

/// Download the entire body with one unranged request.
///
/// Used when the server does not advertise range support, or when the
/// content length is unknown.
#[derive(Debug, Default)]
pub struct SingleStreamStrategy;

impl DownloadStrategy for SingleStreamStrategy {
    fn execute(
        &self,
        job: &DownloadJob,
        source: &Arc<dyn RemoteSource>,
        done_tx: &Sender<TaskDone>,
        cancel: &CancellationToken,
    ) -> JobReport {
        let mut report = JobReport::new(1);

        let result = fetch_whole_body(source.as_ref(), job, cancel);
        let _ = done_tx.send(TaskDone { task: 0 });

        match result {
            Ok(bytes) => report.record_success(bytes),
            Err(e) => {
                warn!(url = %job.url, error = %e, "single-stream download failed");
                report.record_failure(RangeFailure {
                    range: ByteRange::new(0, job.content_length),
                    reason: e.to_string(),
                });
            }
        }
        report
    }
}

fn fetch_whole_body(
    source: &dyn RemoteSource,
    job: &DownloadJob,
    cancel: &CancellationToken,
) -> Result<u64, DownloadError> {
    if cancel.is_cancelled() {
        return Err(DownloadError::Cancelled);
    }
    let body = source.fetch_all(&job.url)?;
    if cancel.is_cancelled() {
        return Err(DownloadError::Cancelled);
    }
    writer::write_at(&job.dest, 0, &body)?;
    Ok(body.len() as u64)
}

/// Download the job as one ranged request per worker, in parallel.
///
/// Tasks are dispatched in batches of at most `max_in_flight` threads, so
/// the requested worker count (how the file is partitioned) is decoupled
/// from how many requests are in flight at once. A failed task is recorded
/// and never aborts its siblings.
#[derive(Debug)]
pub struct MultiRangeStrategy {
    /// Maximum number of concurrently running tasks.
    pub max_in_flight: usize,
}

impl MultiRangeStrategy {
    /// Create a strategy with the given in-flight bound (minimum 1).
    pub fn new(max_in_flight: usize) -> Self {
        Self {
            max_in_flight: max_in_flight.max(1),
        }
    }
}

impl DownloadStrategy for MultiRangeStrategy {
    fn execute(
        &self,
        job: &DownloadJob,
        source: &Arc<dyn RemoteSource>,
        done_tx: &Sender<TaskDone>,
        cancel: &CancellationToken,
    ) -> JobReport {
        let ranges = split_ranges(job.content_length, job.workers);
        let mut report = JobReport::new(ranges.len());

        let indexed: Vec<(usize, ByteRange)> = ranges.into_iter().enumerate().collect();
        for batch in indexed.chunks(self.max_in_flight) {
            let mut handles = Vec::with_capacity(batch.len());

            for &(task, range) in batch {
                let source = Arc::clone(source);
                let url = job.url.clone();
                let dest = job.dest.clone();
                let done_tx = done_tx.clone();
                let cancel = cancel.clone();

                let handle = thread::spawn(move || {
                    let result = run_range_task(source.as_ref(), &url, &dest, range, &cancel);
                    // Exactly one completion signal per task, whatever the
                    // outcome, so the progress bar always reaches 100%.
                    let _ = done_tx.send(TaskDone { task });
                    result
                });
                handles.push((range, handle));
            }

            for (range, handle) in handles {
                match handle.join() {
                    Ok(Ok(bytes)) => report.record_success(bytes),
                    Ok(Err(e)) => {
                        warn!(range = %range, error = %e, "range task failed");
                        report.record_failure(RangeFailure {
                            range,
                            reason: e.to_string(),
                        });
                    }
                    Err(_) => {
                        warn!(range = %range, "range task panicked");
                        report.record_failure(RangeFailure {
                            range,
                            reason: "worker thread panicked".to_string(),
                        });
                    }
                }
            }
        }

        report
    }
}

/// Fetch one range and write it at its offset.
///
/// Empty ranges complete immediately: a degenerate assignment is a no-op,
/// not an error.
fn run_range_task(
    source: &dyn RemoteSource,
    url: &str,
    dest: &Path,
    range: ByteRange,
    cancel: &CancellationToken,
) -> Result<u64, DownloadError> {
    if range.is_empty() {
        debug!(range = %range, "skipping degenerate range");
        return Ok(0);
    }
    if cancel.is_cancelled() {
        return Err(DownloadError::Cancelled);
    }

    debug!(range = %range, "fetching range");
    let body = source.fetch_range(url, range)?;

    if cancel.is_cancelled() {
        return Err(DownloadError::Cancelled);
    }

    writer::write_at(dest, range.start, &body)?;
    debug!(range = %range, bytes = body.len(), "range written");
    Ok(body.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::tests::MockRemoteSource;
    use crate::http::ResourceInfo;
    use std::fs;
    use std::sync::mpsc;

    fn job_for(dir: &tempfile::TempDir, body_len: u64, workers: usize) -> DownloadJob {
        DownloadJob::new(
            "http://example.com/f.bin",
            dir.path().join("f.bin"),
            ResourceInfo {
                content_length: body_len,
                accept_ranges: true,
            },
            workers,
        )
    }

    fn body_of(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    #[test]
    fn test_multi_range_reassembles_the_body() {
        let dir = tempfile::tempdir().unwrap();
        let body = body_of(1000);
        let source: Arc<dyn RemoteSource> = Arc::new(MockRemoteSource::new(body.clone(), true));
        let job = job_for(&dir, 1000, 3);
        writer::prepare_destination(&job.dest, 1000).unwrap();
        let (tx, rx) = mpsc::channel();

        let report =
            MultiRangeStrategy::new(3).execute(&job, &source, &tx, &CancellationToken::new());

        assert!(report.is_complete());
        assert!(!report.has_failures());
        assert_eq!(report.bytes_written, 1000);
        assert_eq!(fs::read(&job.dest).unwrap(), body);
        // One signal per task.
        drop(tx);
        assert_eq!(rx.iter().count(), 3);
    }

    #[test]
    fn test_failed_range_does_not_abort_siblings() {
        let dir = tempfile::tempdir().unwrap();
        let body = body_of(900);
        let source: Arc<dyn RemoteSource> = Arc::new(
            MockRemoteSource::new(body.clone(), true).failing_on(ByteRange::new(300, 600)),
        );
        let job = job_for(&dir, 900, 3);
        writer::prepare_destination(&job.dest, 900).unwrap();
        let (tx, rx) = mpsc::channel();

        let report =
            MultiRangeStrategy::new(3).execute(&job, &source, &tx, &CancellationToken::new());

        assert!(report.is_complete());
        assert_eq!(report.failure_count(), 1);
        assert_eq!(report.failed[0].range, ByteRange::new(300, 600));
        assert_eq!(report.succeeded, 2);

        // Sibling ranges landed despite the failure.
        let written = fs::read(&job.dest).unwrap();
        assert_eq!(&written[..300], &body[..300]);
        assert_eq!(&written[600..], &body[600..]);

        // The failed task still signalled completion.
        drop(tx);
        assert_eq!(rx.iter().count(), 3);
    }

    #[test]
    fn test_degenerate_ranges_complete_as_noops() {
        let dir = tempfile::tempdir().unwrap();
        let body = body_of(2);
        let source: Arc<dyn RemoteSource> = Arc::new(MockRemoteSource::new(body.clone(), true));
        let job = job_for(&dir, 2, 5);
        writer::prepare_destination(&job.dest, 2).unwrap();
        let (tx, rx) = mpsc::channel();

        let report =
            MultiRangeStrategy::new(5).execute(&job, &source, &tx, &CancellationToken::new());

        assert!(report.is_complete());
        assert!(!report.has_failures());
        assert_eq!(report.bytes_written, 2);
        assert_eq!(fs::read(&job.dest).unwrap(), body);
        drop(tx);
        assert_eq!(rx.iter().count(), 5);
    }

    #[test]
    fn test_bounded_batches_still_cover_all_ranges() {
        let dir = tempfile::tempdir().unwrap();
        let body = body_of(4096);
        let source: Arc<dyn RemoteSource> = Arc::new(MockRemoteSource::new(body.clone(), true));
        let job = job_for(&dir, 4096, 8);
        writer::prepare_destination(&job.dest, 4096).unwrap();
        let (tx, _rx) = mpsc::channel();

        // Two tasks in flight at a time, eight ranges overall.
        let report =
            MultiRangeStrategy::new(2).execute(&job, &source, &tx, &CancellationToken::new());

        assert_eq!(report.total_tasks, 8);
        assert!(!report.has_failures());
        assert_eq!(fs::read(&job.dest).unwrap(), body);
    }

    #[test]
    fn test_cancelled_token_fails_tasks() {
        let dir = tempfile::tempdir().unwrap();
        let source: Arc<dyn RemoteSource> =
            Arc::new(MockRemoteSource::new(body_of(100), true));
        let job = job_for(&dir, 100, 2);
        writer::prepare_destination(&job.dest, 100).unwrap();
        let (tx, _rx) = mpsc::channel();

        let cancel = CancellationToken::new();
        cancel.cancel();
        let report = MultiRangeStrategy::new(2).execute(&job, &source, &tx, &cancel);

        assert!(report.is_complete());
        assert_eq!(report.failure_count(), 2);
        for failure in &report.failed {
            assert!(failure.reason.contains("cancelled"));
        }
    }

    #[test]
    fn test_single_stream_writes_at_offset_zero() {
        let dir = tempfile::tempdir().unwrap();
        let body = body_of(777);
        let source: Arc<dyn RemoteSource> = Arc::new(MockRemoteSource::new(body.clone(), false));
        let job = DownloadJob::new(
            "http://example.com/f.bin",
            dir.path().join("f.bin"),
            ResourceInfo {
                content_length: 777,
                accept_ranges: false,
            },
            4,
        );
        writer::prepare_destination(&job.dest, 777).unwrap();
        let (tx, rx) = mpsc::channel();

        let report =
            SingleStreamStrategy.execute(&job, &source, &tx, &CancellationToken::new());

        assert!(report.is_complete());
        assert_eq!(report.total_tasks, 1);
        assert_eq!(fs::read(&job.dest).unwrap(), body);
        drop(tx);
        assert_eq!(rx.iter().count(), 1);
    }
}
