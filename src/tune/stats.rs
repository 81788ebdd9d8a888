//! Sweep statistics collection.
//!
//! Thread-safe counters updated by worker threads as cells complete, then
//! snapshotted into a plain [`SweepStats`] value once the sweep is done.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Snapshot of one finished sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepStats {
    /// Grid cells completed.
    pub cells_completed: usize,
    /// Cells whose solver did not converge.
    pub convergence_warnings: usize,
    /// Sum of per-cell wall time across workers.
    pub total_cell_time: Duration,
    /// Slowest cell.
    pub max_cell_time: Duration,
    /// Fastest cell.
    pub min_cell_time: Duration,
    /// Wall time of the whole sweep.
    pub wall_time: Duration,
}

/// Collector for gathering statistics during a sweep.
#[derive(Debug)]
pub struct SweepStatsCollector {
    cells_completed: AtomicUsize,
    convergence_warnings: AtomicUsize,
    total_cell_nanos: AtomicU64,
    extremes: Mutex<(Duration, Duration)>,
    started: Instant,
}

impl SweepStatsCollector {
    /// Create a collector; the sweep clock starts now.
    pub fn new() -> Self {
        SweepStatsCollector {
            cells_completed: AtomicUsize::new(0),
            convergence_warnings: AtomicUsize::new(0),
            total_cell_nanos: AtomicU64::new(0),
            extremes: Mutex::new((Duration::MAX, Duration::ZERO)),
            started: Instant::now(),
        }
    }

    /// Record one completed cell.
    pub fn record_cell(&self, elapsed: Duration, converged: bool) {
        self.cells_completed.fetch_add(1, Ordering::Relaxed);
        if !converged {
            self.convergence_warnings.fetch_add(1, Ordering::Relaxed);
        }
        self.total_cell_nanos
            .fetch_add(elapsed.as_nanos() as u64, Ordering::Relaxed);

        let mut extremes = self.extremes.lock();
        extremes.0 = extremes.0.min(elapsed);
        extremes.1 = extremes.1.max(elapsed);
    }

    /// Snapshot the counters.
    pub fn snapshot(&self) -> SweepStats {
        let cells_completed = self.cells_completed.load(Ordering::Relaxed);
        let (min, max) = *self.extremes.lock();

        SweepStats {
            cells_completed,
            convergence_warnings: self.convergence_warnings.load(Ordering::Relaxed),
            total_cell_time: Duration::from_nanos(self.total_cell_nanos.load(Ordering::Relaxed)),
            max_cell_time: max,
            min_cell_time: if cells_completed == 0 {
                Duration::ZERO
            } else {
                min
            },
            wall_time: self.started.elapsed(),
        }
    }
}

impl Default for SweepStatsCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_counts() {
        let collector = SweepStatsCollector::new();
        collector.record_cell(Duration::from_millis(2), true);
        collector.record_cell(Duration::from_millis(3), false);

        let stats = collector.snapshot();
        assert_eq!(stats.cells_completed, 2);
        assert_eq!(stats.convergence_warnings, 1);
        assert_eq!(stats.total_cell_time, Duration::from_millis(5));
        assert_eq!(stats.min_cell_time, Duration::from_millis(2));
        assert_eq!(stats.max_cell_time, Duration::from_millis(3));
    }

    #[test]
    fn test_empty_snapshot() {
        let stats = SweepStatsCollector::new().snapshot();
        assert_eq!(stats.cells_completed, 0);
        assert_eq!(stats.min_cell_time, Duration::ZERO);
        assert_eq!(stats.max_cell_time, Duration::ZERO);
    }
}
