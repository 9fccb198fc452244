//! Byte-range planning for parallel downloads.
//!
//! The planner divides a file of known length into exactly one range per
//! worker. Ranges are half-open internally (`start..end`) and render as the
//! inclusive `bytes=<start>-<end>` form a Range request header expects.

use std::fmt;

/// A half-open interval `[start, end)` of a resource's bytes.
///
/// An empty range (`start == end`) represents a degenerate assignment: it is
/// produced when a file is smaller than the requested worker count and is
/// treated as a no-op by fetch and write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    /// First byte offset covered by this range.
    pub start: u64,
    /// One past the last byte offset covered by this range.
    pub end: u64,
}

impl ByteRange {
    /// Create a range covering `[start, end)`.
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Number of bytes covered.
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    /// True when the range covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Render the standard inclusive request form, e.g. `bytes=0-499`.
    ///
    /// Only meaningful for non-empty ranges; callers skip empty ranges
    /// before issuing a request.
    pub fn header_value(&self) -> String {
        format!("bytes={}-{}", self.start, self.end.saturating_sub(1))
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "empty range at {}", self.start)
        } else {
            write!(f, "bytes {}-{}", self.start, self.end - 1)
        }
    }
}

/// Divide `total_len` bytes into exactly `workers` ordered ranges.
///
/// The block size is the truncating division `total_len / workers`; worker
/// `i` is assigned `[i * block, (i + 1) * block)` and the final worker's end
/// is extended to `total_len`, absorbing the remainder. The result is always
/// ordered, contiguous, pairwise disjoint, and covers `[0, total_len)`
/// exactly. When `total_len < workers` the surplus workers receive empty
/// ranges rather than reducing the worker count.
///
/// A worker count of zero is rejected by configuration validation before any
/// planning happens.
pub fn split_ranges(total_len: u64, workers: usize) -> Vec<ByteRange> {
    assert!(workers > 0, "worker count must be positive");

    let block = total_len / workers as u64;
    let mut ranges = Vec::with_capacity(workers);
    for i in 0..workers as u64 {
        let start = i * block;
        let end = if i == workers as u64 - 1 {
            total_len
        } else {
            (i + 1) * block
        };
        ranges.push(ByteRange::new(start, end));
    }
    ranges
}
