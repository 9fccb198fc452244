//! parget - concurrent, range-based HTTP file downloader.
//!
//! Given a URL, parget probes the resource for its size and range support,
//! splits the file into one byte range per worker, fetches the ranges in
//! parallel, and writes each range at its offset in a single pre-sized
//! destination file while reporting aggregate progress.
//!
//! # Architecture
//!
//! ```text
//! Downloader (orchestrator)
//!         │
//!         ├── RemoteSource (trait)
//!         │       └── HttpSource (blocking reqwest)
//!         │
//!         ├── DownloadStrategy (trait)
//!         │       ├── SingleStreamStrategy
//!         │       └── MultiRangeStrategy
//!         │
//!         ├── split_ranges (pure range planner)
//!         │
//!         ├── writer (positional writes, one handle per write)
//!         │
//!         └── ProgressTracker (completion signals → snapshots)
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use parget::{DownloadConfig, Downloader};
//! use tokio_util::sync::CancellationToken;
//!
//! let downloader = Downloader::new(DownloadConfig::new().with_workers(6));
//! let report = downloader
//!     .run(
//!         "https://example.com/large-file.bin",
//!         Path::new("large-file.bin"),
//!         &CancellationToken::new(),
//!         Some(Box::new(|snapshot| println!("{snapshot}"))),
//!     )
//!     .expect("download failed");
//! println!("wrote {} bytes", report.bytes_written);
//! ```

mod config;
mod error;
mod http;
mod orchestrator;
mod progress;
mod range;
mod state;
mod strategy;
mod writer;

pub use config::{destination_from_url, format_size, DownloadConfig, DEFAULT_WORKERS};
pub use error::{DownloadError, DownloadResult, RangeFailure};
pub use http::{HttpSource, RemoteSource, ResourceInfo, USER_AGENT};
pub use orchestrator::{Downloader, ProgressCallback};
pub use progress::{ProgressSnapshot, ProgressTracker, TaskDone, BAR_WIDTH};
pub use range::{split_ranges, ByteRange};
pub use state::{DownloadJob, JobReport};
pub use strategy::{DownloadStrategy, MultiRangeStrategy, SingleStreamStrategy};
pub use writer::{prepare_destination, write_at};

/// Library version, as reported by the CLI.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
