//! Outcome aggregation for load test runs.
//!
//! Counters and exact min/max/sum are atomics; percentiles come from an
//! HdrHistogram. Everything is recorded in microseconds and reported in
//! milliseconds.

use hdrhistogram::Histogram;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use super::report::{LoadTestResult, ResponseTimeStats};

/// Upper bound of the latency histogram (10 minutes)
const MAX_TRACKABLE_US: u64 = 600_000_000;

/// Thread-safe collector shared by all simulated users of a run
pub struct LoadMetrics {
    /// Latency distribution (microseconds)
    latency_histogram: Mutex<Histogram<u64>>,
    success_count: AtomicU64,
    failure_count: AtomicU64,
    latency_min_us: AtomicU64,
    latency_max_us: AtomicU64,
    latency_sum_us: AtomicU64,
    /// Distinct error messages in first-seen order
    errors: Mutex<Vec<String>>,
    start_time: Mutex<Option<Instant>>,
    end_time: Mutex<Option<Instant>>,
}

impl LoadMetrics {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            latency_histogram: Mutex::new(Histogram::new_with_bounds(1, MAX_TRACKABLE_US, 3)?),
            success_count: AtomicU64::new(0),
            failure_count: AtomicU64::new(0),
            latency_min_us: AtomicU64::new(u64::MAX),
            latency_max_us: AtomicU64::new(0),
            latency_sum_us: AtomicU64::new(0),
            errors: Mutex::new(Vec::new()),
            start_time: Mutex::new(None),
            end_time: Mutex::new(None),
        })
    }

    /// Mark the start of the run
    pub fn start(&self) {
        *lock(&self.start_time) = Some(Instant::now());
    }

    /// Mark the end of the run
    pub fn stop(&self) {
        *lock(&self.end_time) = Some(Instant::now());
    }

    /// Record a 2xx response
    pub fn record_success(&self, latency: Duration) {
        self.record_latency(latency);
        self.success_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a non-2xx response or transport error
    pub fn record_failure(&self, latency: Duration, error: impl Into<String>) {
        self.record_latency(latency);
        self.failure_count.fetch_add(1, Ordering::Relaxed);

        let error = error.into();
        let mut errors = lock(&self.errors);
        if !errors.contains(&error) {
            errors.push(error);
        }
    }

    fn record_latency(&self, latency: Duration) {
        let latency_us = (latency.as_micros() as u64).max(1);

        lock(&self.latency_histogram).saturating_record(latency_us);
        self.latency_min_us.fetch_min(latency_us, Ordering::Relaxed);
        self.latency_max_us.fetch_max(latency_us, Ordering::Relaxed);
        self.latency_sum_us.fetch_add(latency_us, Ordering::Relaxed);
    }

    pub fn success_count(&self) -> u64 {
        self.success_count.load(Ordering::Relaxed)
    }

    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }

    pub fn total_requests(&self) -> u64 {
        self.success_count() + self.failure_count()
    }

    /// Wall-clock time between `start` and `stop` (or now, if still running)
    pub fn elapsed(&self) -> Duration {
        let start = *lock(&self.start_time);
        let end = *lock(&self.end_time);
        match (start, end) {
            (Some(s), Some(e)) => e.duration_since(s),
            (Some(s), None) => s.elapsed(),
            _ => Duration::ZERO,
        }
    }

    pub fn requests_per_second(&self) -> f64 {
        let elapsed = self.elapsed().as_secs_f64();
        let total = self.total_requests();
        if total == 0 || elapsed == 0.0 {
            return 0.0;
        }
        total as f64 / elapsed
    }

    pub fn errors(&self) -> Vec<String> {
        lock(&self.errors).clone()
    }

    fn response_time(&self) -> ResponseTimeStats {
        let total = self.total_requests();
        if total == 0 {
            return ResponseTimeStats::default();
        }

        let hist = lock(&self.latency_histogram);
        let sum_us = self.latency_sum_us.load(Ordering::Relaxed);

        ResponseTimeStats {
            min: us_to_ms(self.latency_min_us.load(Ordering::Relaxed)),
            max: us_to_ms(self.latency_max_us.load(Ordering::Relaxed)),
            average: sum_us as f64 / total as f64 / 1000.0,
            p50: us_to_ms(hist.value_at_quantile(0.50)),
            p95: us_to_ms(hist.value_at_quantile(0.95)),
            p99: us_to_ms(hist.value_at_quantile(0.99)),
        }
    }

    /// Summarize everything recorded so far
    pub fn summary(&self) -> LoadTestResult {
        let successful_requests = self.success_count();
        let failed_requests = self.failure_count();

        LoadTestResult {
            test_duration: self.elapsed().as_secs_f64(),
            total_requests: successful_requests + failed_requests,
            successful_requests,
            failed_requests,
            requests_per_second: self.requests_per_second(),
            response_time: self.response_time(),
            errors: self.errors(),
            users_spawned: 0,
        }
    }
}

fn us_to_ms(us: u64) -> f64 {
    us as f64 / 1000.0
}

/// Lock a mutex, recovering the data if a recording task panicked
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
