use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use extract::ExtractionResult;

pub struct Metrics {
    // Counters
    batches: AtomicUsize,
    identifiers: AtomicUsize,
    successes: AtomicUsize,
    absent: AtomicUsize,
    failures: AtomicUsize,
    fetches: AtomicUsize,

    // Timing (in microseconds)
    total_fetch_time_us: AtomicU64,
    total_extract_time_us: AtomicU64,
}

impl Metrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            batches: AtomicUsize::new(0),
            identifiers: AtomicUsize::new(0),
            successes: AtomicUsize::new(0),
            absent: AtomicUsize::new(0),
            failures: AtomicUsize::new(0),
            fetches: AtomicUsize::new(0),
            total_fetch_time_us: AtomicU64::new(0),
            total_extract_time_us: AtomicU64::new(0),
        })
    }

    pub fn record_batch(&self, size: usize) {
        self.batches.fetch_add(1, Ordering::Relaxed);
        self.identifiers.fetch_add(size, Ordering::Relaxed);
    }

    pub fn record_outcome(&self, result: &ExtractionResult) {
        let counter = if result.is_success() {
            &self.successes
        } else if result.is_absent() {
            &self.absent
        } else {
            &self.failures
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Time of a fetch that returned a document; failed fetches are not timed.
    pub fn record_fetch(&self, duration: Duration) {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        self.total_fetch_time_us
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn record_extract(&self, duration: Duration) {
        self.total_extract_time_us
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let identifiers = self.identifiers.load(Ordering::Relaxed);
        let fetches = self.fetches.load(Ordering::Relaxed);
        MetricsSnapshot {
            batches: self.batches.load(Ordering::Relaxed),
            identifiers,
            successes: self.successes.load(Ordering::Relaxed),
            absent: self.absent.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            fetches,
            avg_fetch_time_ms: avg_time_ms(&self.total_fetch_time_us, fetches),
            avg_extract_time_ms: avg_time_ms(&self.total_extract_time_us, fetches),
        }
    }
}

fn avg_time_ms(total_us: &AtomicU64, count: usize) -> f64 {
    let total = total_us.load(Ordering::Relaxed) as f64;
    if count > 0 {
        total / count as f64 / 1000.0
    } else {
        0.0
    }
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub batches: usize,
    pub identifiers: usize,
    pub successes: usize,
    pub absent: usize,
    pub failures: usize,
    pub fetches: usize,
    pub avg_fetch_time_ms: f64,
    pub avg_extract_time_ms: f64,
}

pub struct TimedOperation {
    start: Instant,
}

impl TimedOperation {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcomes_counted_by_kind() {
        let metrics = Metrics::new();
        metrics.record_batch(3);
        metrics.record_outcome(&ExtractionResult::absent());
        metrics.record_outcome(&ExtractionResult::transport_failure("timeout"));
        metrics.record_outcome(&ExtractionResult::fault("panicked"));

        let snapshot = metrics.snapshot();

        assert_eq!(snapshot.batches, 1);
        assert_eq!(snapshot.identifiers, 3);
        assert_eq!(snapshot.absent, 1);
        assert_eq!(snapshot.failures, 2);
        assert_eq!(snapshot.successes, 0);
    }

    #[test]
    fn test_average_time() {
        let metrics = Metrics::new();
        assert_eq!(metrics.snapshot().avg_extract_time_ms, 0.0);

        metrics.record_batch(2);
        metrics.record_fetch(Duration::from_millis(10));
        metrics.record_fetch(Duration::from_millis(20));
        metrics.record_extract(Duration::from_millis(3));
        metrics.record_extract(Duration::from_millis(5));

        assert_eq!(metrics.snapshot().avg_fetch_time_ms, 15.0);
        assert_eq!(metrics.snapshot().avg_extract_time_ms, 4.0);
    }

    #[test]
    fn test_failed_fetches_not_in_fetch_average() {
        let metrics = Metrics::new();
        metrics.record_batch(3);
        metrics.record_fetch(Duration::from_millis(12));
        metrics.record_outcome(&ExtractionResult::transport_failure("timeout"));
        metrics.record_outcome(&ExtractionResult::transport_failure("timeout"));

        let snapshot = metrics.snapshot();

        assert_eq!(snapshot.fetches, 1);
        assert_eq!(snapshot.avg_fetch_time_ms, 12.0);
    }
}
