//! Per-file progress tracking
//!
//! A [`ProgressTracker`] is ephemeral state for one file's transfer:
//! bytes seen so far out of the total, accumulated under a lock since
//! multiple part-upload workers report concurrently. Each recorded delta
//! emits a [`ProgressUpdate`] to the sink the caller supplied.

use std::sync::Mutex;

/// Snapshot of a file's transfer progress
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    /// Local path being transferred, used as the display label
    pub label: String,
    /// Bytes transferred so far
    pub bytes_so_far: u64,
    /// Total bytes to transfer
    pub total_bytes: u64,
}

impl ProgressUpdate {
    /// Completion percentage; an empty file counts as fully transferred
    pub fn percent(&self) -> f64 {
        if self.total_bytes == 0 {
            100.0
        } else {
            (self.bytes_so_far as f64 / self.total_bytes as f64) * 100.0
        }
    }

    /// Render as a carriage-return-prefixed line that overwrites the
    /// previous progress line in place
    pub fn render(&self) -> String {
        format!(
            "\r{}  {} / {}  ({:.2}%)",
            self.label,
            self.bytes_so_far,
            self.total_bytes,
            self.percent()
        )
    }
}

/// Mutex-guarded byte counter for one file's transfer
pub struct ProgressTracker {
    label: String,
    total_bytes: u64,
    seen_so_far: Mutex<u64>,
    sink: Box<dyn Fn(ProgressUpdate) + Send + Sync>,
}

impl ProgressTracker {
    pub fn new(
        label: impl Into<String>,
        total_bytes: u64,
        sink: impl Fn(ProgressUpdate) + Send + Sync + 'static,
    ) -> Self {
        Self {
            label: label.into(),
            total_bytes,
            seen_so_far: Mutex::new(0),
            sink: Box::new(sink),
        }
    }

    /// Record a chunk of transferred bytes and emit an update.
    ///
    /// Safe to call from concurrent part-upload workers; accumulation and
    /// snapshot happen under the lock so emitted updates never go
    /// backwards.
    pub fn record(&self, bytes_delta: u64) {
        let update = {
            let mut seen = self.seen_so_far.lock().expect("progress lock poisoned");
            *seen += bytes_delta;
            ProgressUpdate {
                label: self.label.clone(),
                bytes_so_far: *seen,
                total_bytes: self.total_bytes,
            }
        };
        (self.sink)(update);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex as StdMutex};

    #[test]
    fn test_deltas_sum_to_one_hundred_percent() {
        let updates = Arc::new(StdMutex::new(Vec::new()));
        let sink_updates = updates.clone();
        let tracker = ProgressTracker::new("file.bin", 1000, move |u| {
            sink_updates.lock().unwrap().push(u);
        });

        tracker.record(300);
        tracker.record(300);
        tracker.record(400);

        let updates = updates.lock().unwrap();
        assert_eq!(updates.len(), 3);
        assert_eq!(updates[0].bytes_so_far, 300);
        assert_eq!(updates[2].bytes_so_far, 1000);
        assert_eq!(format!("{:.2}", updates[2].percent()), "100.00");
    }

    #[test]
    fn test_render_overwrites_in_place() {
        let update = ProgressUpdate {
            label: "/data/report.csv".to_string(),
            bytes_so_far: 512,
            total_bytes: 1000,
        };
        let line = update.render();
        assert!(line.starts_with('\r'));
        assert_eq!(line, "\r/data/report.csv  512 / 1000  (51.20%)");
    }

    #[test]
    fn test_empty_file_is_complete() {
        let update = ProgressUpdate {
            label: "empty".to_string(),
            bytes_so_far: 0,
            total_bytes: 0,
        };
        assert_eq!(update.percent(), 100.0);
    }

    #[test]
    fn test_concurrent_recording() {
        let updates = Arc::new(StdMutex::new(Vec::new()));
        let sink_updates = updates.clone();
        let tracker = Arc::new(ProgressTracker::new("big.bin", 10_000, move |u| {
            sink_updates.lock().unwrap().push(u);
        }));

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let tracker = tracker.clone();
                std::thread::spawn(move || tracker.record(1000))
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let updates = updates.lock().unwrap();
        assert_eq!(updates.len(), 10);
        let max = updates.iter().map(|u| u.bytes_so_far).max().unwrap();
        assert_eq!(max, 10_000);
    }
}
