// Transfer accounting for relay streams
//
// Purely derived numbers: bytes over elapsed time. Nothing here is
// authoritative; clients compute their own progress from chunk arrival.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Point-in-time view of a transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub percentage: f64,
    pub transferred_bytes: u64,
    pub total_bytes: Option<u64>,
    pub bytes_per_second: f64,
    pub eta_seconds: Option<f64>,
}

/// Counts bytes for one stream and derives rate/ETA on demand.
#[derive(Debug)]
pub struct ProgressTracker {
    started: Instant,
    transferred: u64,
    total: Option<u64>,
}

impl ProgressTracker {
    pub fn new(total: Option<u64>) -> Self {
        Self {
            started: Instant::now(),
            transferred: 0,
            total,
        }
    }

    pub fn record(&mut self, bytes: u64) {
        self.transferred += bytes;
    }

    pub fn transferred(&self) -> u64 {
        self.transferred
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        self.snapshot_at(self.started.elapsed())
    }

    // Split out so the math is testable with a fixed elapsed time.
    fn snapshot_at(&self, elapsed: Duration) -> ProgressSnapshot {
        let secs = elapsed.as_secs_f64();
        let rate = if secs > 0.0 {
            self.transferred as f64 / secs
        } else {
            0.0
        };

        let percentage = match self.total {
            Some(total) if total > 0 => {
                ((self.transferred as f64 / total as f64) * 100.0).min(100.0)
            }
            _ => 0.0,
        };

        let eta_seconds = match self.total {
            Some(total) if rate > 0.0 && total > self.transferred => {
                Some((total - self.transferred) as f64 / rate)
            }
            Some(_) => Some(0.0),
            None => None,
        };

        ProgressSnapshot {
            percentage,
            transferred_bytes: self.transferred,
            total_bytes: self.total,
            bytes_per_second: rate,
            eta_seconds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_and_eta() {
        let mut tracker = ProgressTracker::new(Some(1000));
        tracker.record(250);

        let snap = tracker.snapshot_at(Duration::from_secs(1));
        assert_eq!(snap.transferred_bytes, 250);
        assert!((snap.percentage - 25.0).abs() < f64::EPSILON);
        assert!((snap.bytes_per_second - 250.0).abs() < f64::EPSILON);
        assert!((snap.eta_seconds.unwrap() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_total() {
        let mut tracker = ProgressTracker::new(None);
        tracker.record(4096);

        let snap = tracker.snapshot_at(Duration::from_secs(2));
        assert_eq!(snap.percentage, 0.0);
        assert!(snap.eta_seconds.is_none());
        assert!((snap.bytes_per_second - 2048.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_percentage_clamped() {
        let mut tracker = ProgressTracker::new(Some(100));
        tracker.record(250);

        let snap = tracker.snapshot_at(Duration::from_secs(1));
        assert_eq!(snap.percentage, 100.0);
        assert_eq!(snap.eta_seconds, Some(0.0));
    }
}
