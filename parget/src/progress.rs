//! Completion tracking and progress-bar rendering.
//!
//! Every download task sends exactly one [`TaskDone`] signal when it
//! finishes, successfully or not. [`ProgressTracker`] consumes those
//! signals and lazily yields one [`ProgressSnapshot`] per arrival until all
//! tasks have reported, ending on the 100% snapshot. The tracker is purely
//! a consumer and never blocks the sending tasks (the channel is
//! unbounded).

use std::fmt;
use std::sync::mpsc::Receiver;

/// Width of the rendered progress bar in columns.
pub const BAR_WIDTH: usize = 100;

/// Signal that one task finished, successfully or not.
///
/// Carries the task index for logging only; the tracker counts arrivals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskDone {
    /// Index of the finished task.
    pub task: usize,
}

/// Point-in-time completion state of a download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSnapshot {
    /// Tasks that have finished so far.
    pub completed: usize,
    /// Total number of tasks.
    pub total: usize,
}

impl ProgressSnapshot {
    /// Completion percentage in `[0.0, 100.0]`.
    ///
    /// A job with no tasks is complete by definition.
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            self.completed as f64 / self.total as f64 * 100.0
        }
    }

    /// Render the bar: `floor(percentage)` filled columns out of
    /// [`BAR_WIDTH`].
    pub fn render_bar(&self) -> String {
        let filled = (self.percentage().floor() as usize).min(BAR_WIDTH);
        let mut bar = String::with_capacity(BAR_WIDTH);
        bar.extend(std::iter::repeat('=').take(filled));
        bar.extend(std::iter::repeat(' ').take(BAR_WIDTH - filled));
        bar
    }
}

impl fmt::Display for ProgressSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Download progress: [{}] {:.2}%",
            self.render_bar(),
            self.percentage()
        )
    }
}

/// Lazy sequence of progress snapshots driven by completion signals.
///
/// Yields one snapshot per received [`TaskDone`]; the snapshot where
/// `completed == total` is the final item. A closed channel also ends the
/// sequence, so a job whose tasks vanish cannot hang the consumer.
pub struct ProgressTracker {
    total: usize,
    completed: usize,
    rx: Receiver<TaskDone>,
    finished: bool,
}

impl ProgressTracker {
    /// Create a tracker expecting `total` completion signals on `rx`.
    pub fn new(total: usize, rx: Receiver<TaskDone>) -> Self {
        Self {
            total,
            completed: 0,
            rx,
            finished: false,
        }
    }

    fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            completed: self.completed,
            total: self.total,
        }
    }
}

impl Iterator for ProgressTracker {
    type Item = ProgressSnapshot;

    fn next(&mut self) -> Option<ProgressSnapshot> {
        if self.finished {
            return None;
        }

        if self.total == 0 {
            self.finished = true;
            return Some(self.snapshot());
        }

        match self.rx.recv() {
            Ok(_done) => {
                self.completed += 1;
                if self.completed == self.total {
                    self.finished = true;
                }
                Some(self.snapshot())
            }
            // All senders dropped without completing; end the sequence.
            Err(_) => {
                self.finished = true;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_percentage() {
        let snap = ProgressSnapshot {
            completed: 1,
            total: 3,
        };
        assert!((snap.percentage() - 33.333).abs() < 0.01);

        let done = ProgressSnapshot {
            completed: 3,
            total: 3,
        };
        assert_eq!(done.percentage(), 100.0);
    }

    #[test]
    fn test_zero_tasks_is_complete() {
        let snap = ProgressSnapshot {
            completed: 0,
            total: 0,
        };
        assert_eq!(snap.percentage(), 100.0);
    }

    #[test]
    fn test_bar_fill_uses_floor() {
        let snap = ProgressSnapshot {
            completed: 1,
            total: 3,
        };
        let bar = snap.render_bar();
        assert_eq!(bar.len(), BAR_WIDTH);
        assert_eq!(bar.chars().filter(|c| *c == '=').count(), 33);

        let done = ProgressSnapshot {
            completed: 3,
            total: 3,
        };
        assert_eq!(done.render_bar(), "=".repeat(BAR_WIDTH));
    }

    #[test]
    fn test_display_line() {
        let snap = ProgressSnapshot {
            completed: 2,
            total: 4,
        };
        let line = snap.to_string();
        assert!(line.starts_with("Download progress: ["));
        assert!(line.ends_with("] 50.00%"));
    }

    #[test]
    fn test_tracker_counts_to_completion() {
        let (tx, rx) = mpsc::channel();
        for task in 0..4 {
            tx.send(TaskDone { task }).unwrap();
        }
        drop(tx);

        let snapshots: Vec<_> = ProgressTracker::new(4, rx).collect();

        assert_eq!(snapshots.len(), 4);
        let percentages: Vec<f64> = snapshots.iter().map(ProgressSnapshot::percentage).collect();
        for pair in percentages.windows(2) {
            assert!(pair[0] <= pair[1], "percentages must not decrease");
        }
        assert_eq!(*percentages.last().unwrap(), 100.0);
    }

    #[test]
    fn test_tracker_is_order_independent() {
        let (tx, rx) = mpsc::channel();
        // Arrival order does not matter; only the count does.
        for task in [2, 0, 1] {
            tx.send(TaskDone { task }).unwrap();
        }

        let snapshots: Vec<_> = ProgressTracker::new(3, rx).collect();
        assert_eq!(snapshots.len(), 3);
        assert_eq!(snapshots[2].completed, 3);
    }

    #[test]
    fn test_tracker_stops_after_total() {
        let (tx, rx) = mpsc::channel();
        for task in 0..2 {
            tx.send(TaskDone { task }).unwrap();
        }
        // Extra signal beyond the expected total must not be consumed.
        tx.send(TaskDone { task: 99 }).unwrap();

        let snapshots: Vec<_> = ProgressTracker::new(2, rx).collect();
        assert_eq!(snapshots.len(), 2);
    }

    #[test]
    fn test_tracker_ends_on_closed_channel() {
        let (tx, rx) = mpsc::channel::<TaskDone>();
        tx.send(TaskDone { task: 0 }).unwrap();
        drop(tx);

        let snapshots: Vec<_> = ProgressTracker::new(5, rx).collect();

        // One signal arrived, then the channel closed early.
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].completed, 1);
    }

    #[test]
    fn test_tracker_zero_tasks_yields_single_final_snapshot() {
        let (_tx, rx) = mpsc::channel::<TaskDone>();
        let snapshots: Vec<_> = ProgressTracker::new(0, rx).collect();

        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].percentage(), 100.0);
    }
}
