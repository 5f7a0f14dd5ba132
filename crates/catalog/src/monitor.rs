//! Per-operation timing statistics.
//!
//! Every catalog operation reports its elapsed time and outcome here. The
//! monitor keeps running counts and min/avg/max times per operation, plus a
//! short list of the most recent slow operations.

use std::collections::{BTreeMap, VecDeque};
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use chrono::Utc;
use serde::Serialize;
use spice_core::error::CoreError;
use spice_core::types::Timestamp;

/// Operations slower than this are logged at `warn` and kept as slow.
pub const SLOW_OPERATION_THRESHOLD: Duration = Duration::from_millis(100);

/// Slow operations retained for the summary.
const RECENT_SLOW_LIMIT: usize = 20;

/* --------------------------------------------------------------------------
Summary types
-------------------------------------------------------------------------- */

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationSummary {
    pub count: u64,
    pub errors: u64,
    /// Failed share of all calls, in percent.
    pub error_rate: f64,
    pub avg_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    pub total_ms: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlowOperation {
    pub operation: &'static str,
    pub elapsed_ms: f64,
    pub failed: bool,
    pub at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceSummary {
    pub total_operations: u64,
    pub slow_operations: u64,
    pub slow_threshold_ms: u64,
    pub operations: BTreeMap<&'static str, OperationSummary>,
    /// Most recent first.
    pub recent_slow: Vec<SlowOperation>,
}

/* --------------------------------------------------------------------------
Monitor
-------------------------------------------------------------------------- */

#[derive(Debug, Clone, Copy)]
struct OperationStats {
    count: u64,
    errors: u64,
    total: Duration,
    min: Duration,
    max: Duration,
}

impl OperationStats {
    fn first(elapsed: Duration) -> Self {
        Self {
            count: 0,
            errors: 0,
            total: Duration::ZERO,
            min: elapsed,
            max: elapsed,
        }
    }

    fn summary(&self) -> OperationSummary {
        let avg = if self.count == 0 {
            Duration::ZERO
        } else {
            self.total.div_f64(self.count as f64)
        };
        OperationSummary {
            count: self.count,
            errors: self.errors,
            error_rate: round2(self.errors as f64 * 100.0 / self.count.max(1) as f64),
            avg_ms: millis(avg),
            min_ms: millis(self.min),
            max_ms: millis(self.max),
            total_ms: millis(self.total),
        }
    }
}

#[derive(Debug, Default)]
struct Stats {
    operations: BTreeMap<&'static str, OperationStats>,
    total_operations: u64,
    slow_operations: u64,
    recent_slow: VecDeque<SlowOperation>,
}

/// Shared by every catalog service behind an `Arc`.
#[derive(Debug, Default)]
pub struct PerformanceMonitor {
    stats: Mutex<Stats>,
}

impl PerformanceMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `work`, recording its elapsed time and whether it failed.
    pub async fn measure<T, F>(&self, operation: &'static str, work: F) -> Result<T, CoreError>
    where
        F: Future<Output = Result<T, CoreError>>,
    {
        let start = Instant::now();
        let result = work.await;
        self.record(operation, start.elapsed(), result.as_ref().err());
        result
    }

    /// Record one completed operation. `error` is set when it failed.
    pub fn record(&self, operation: &'static str, elapsed: Duration, error: Option<&CoreError>) {
        let elapsed_ms = elapsed.as_millis() as u64;
        let slow = elapsed > SLOW_OPERATION_THRESHOLD;

        match error {
            Some(err) => {
                tracing::warn!(operation, elapsed_ms, error = %err, "Operation failed");
            }
            None if slow => tracing::warn!(operation, elapsed_ms, "Slow operation"),
            None => tracing::debug!(operation, elapsed_ms, "Operation completed"),
        }

        let mut stats = self.lock();
        let entry = stats
            .operations
            .entry(operation)
            .or_insert_with(|| OperationStats::first(elapsed));
        entry.count += 1;
        entry.total += elapsed;
        entry.min = entry.min.min(elapsed);
        entry.max = entry.max.max(elapsed);
        if error.is_some() {
            entry.errors += 1;
        }
        stats.total_operations += 1;

        if slow {
            stats.slow_operations += 1;
            if stats.recent_slow.len() == RECENT_SLOW_LIMIT {
                stats.recent_slow.pop_back();
            }
            stats.recent_slow.push_front(SlowOperation {
                operation,
                elapsed_ms: millis(elapsed),
                failed: error.is_some(),
                at: Utc::now(),
            });
        }
    }

    pub fn summary(&self) -> PerformanceSummary {
        let stats = self.lock();
        PerformanceSummary {
            total_operations: stats.total_operations,
            slow_operations: stats.slow_operations,
            slow_threshold_ms: SLOW_OPERATION_THRESHOLD.as_millis() as u64,
            operations: stats
                .operations
                .iter()
                .map(|(name, op)| (*name, op.summary()))
                .collect(),
            recent_slow: stats.recent_slow.iter().cloned().collect(),
        }
    }

    /// Clear every statistic.
    pub fn reset(&self) {
        *self.lock() = Stats::default();
        tracing::info!("Performance statistics reset");
    }

    fn lock(&self) -> MutexGuard<'_, Stats> {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn millis(duration: Duration) -> f64 {
    round2(duration.as_secs_f64() * 1000.0)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
