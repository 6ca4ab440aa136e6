//! Capture cycle counters and timing
//!
//! Counts cycle invocations per trigger and per outcome, and keeps the last
//! [`MAX_SAMPLES`] cycle durations for percentile reads.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use serde::Serialize;
use snaptrack_domain::{CaptureOutcome, CaptureTrigger, SkipReason};

use crate::observability::{MetricsError, MetricsResult};

pub const MAX_SAMPLES: usize = 1000;

#[derive(Debug, Default)]
pub struct CaptureMetrics {
    alarm_cycles: AtomicUsize,
    tab_cycles: AtomicUsize,
    manual_cycles: AtomicUsize,
    captured: AtomicUsize,
    skipped_no_user: AtomicUsize,
    skipped_timer_stopped: AtomicUsize,
    failed: AtomicUsize,
    durations_ms: Mutex<VecDeque<u64>>,
}

/// Point-in-time copy of [`CaptureMetrics`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CaptureStats {
    pub alarm_cycles: usize,
    pub tab_cycles: usize,
    pub manual_cycles: usize,
    pub captured: usize,
    pub skipped_no_user: usize,
    pub skipped_timer_stopped: usize,
    pub failed: usize,
    pub p50_duration_ms: Option<u64>,
    pub p95_duration_ms: Option<u64>,
}

impl CaptureMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_cycle_started(&self, trigger: CaptureTrigger) -> MetricsResult<()> {
        let counter = match trigger {
            CaptureTrigger::Alarm => &self.alarm_cycles,
            CaptureTrigger::TabActivated => &self.tab_cycles,
            CaptureTrigger::Manual => &self.manual_cycles,
        };
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    pub fn record_outcome(&self, outcome: &CaptureOutcome) -> MetricsResult<()> {
        let counter = match outcome {
            CaptureOutcome::Captured(_) => &self.captured,
            CaptureOutcome::Skipped(SkipReason::NoUser) => &self.skipped_no_user,
            CaptureOutcome::Skipped(SkipReason::TimerStopped) => &self.skipped_timer_stopped,
        };
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    pub fn record_failure(&self) -> MetricsResult<()> {
        self.failed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    /// Store a cycle duration, evicting the oldest sample past
    /// [`MAX_SAMPLES`].
    pub fn record_duration(&self, duration: Duration) -> MetricsResult<()> {
        let ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        let mut samples = match self.durations_ms.lock() {
            Ok(guard) => guard,
            Err(poison_err) => {
                tracing::warn!(
                    metric = "CaptureMetrics::durations_ms",
                    "Mutex poisoned during duration recording, recovering data"
                );
                poison_err.into_inner()
            }
        };
        samples.push_back(ms);
        if samples.len() > MAX_SAMPLES {
            samples.pop_front();
        }
        Ok(())
    }

    /// Cycle duration at `percentile` (0.0..=1.0) in milliseconds.
    ///
    /// Returns `MetricsError::EmptyData` if no samples were recorded.
    pub fn duration_percentile_ms(&self, percentile: f64, metric: &'static str) -> MetricsResult<u64> {
        let samples = match self.durations_ms.lock() {
            Ok(guard) => guard,
            Err(poison_err) => {
                tracing::warn!(
                    metric = "CaptureMetrics::durations_ms",
                    "Mutex poisoned during percentile read, recovering"
                );
                poison_err.into_inner()
            }
        };
        if samples.is_empty() {
            return Err(MetricsError::EmptyData { metric });
        }

        let mut sorted: Vec<u64> = samples.iter().copied().collect();
        drop(samples);
        sorted.sort_unstable();

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
        let index = ((sorted.len() - 1) as f64 * percentile.clamp(0.0, 1.0)).round() as usize;
        Ok(sorted[index.min(sorted.len() - 1)])
    }

    pub fn snapshot(&self) -> CaptureStats {
        CaptureStats {
            alarm_cycles: self.alarm_cycles.load(Ordering::SeqCst),
            tab_cycles: self.tab_cycles.load(Ordering::SeqCst),
            manual_cycles: self.manual_cycles.load(Ordering::SeqCst),
            captured: self.captured.load(Ordering::SeqCst),
            skipped_no_user: self.skipped_no_user.load(Ordering::SeqCst),
            skipped_timer_stopped: self.skipped_timer_stopped.load(Ordering::SeqCst),
            failed: self.failed.load(Ordering::SeqCst),
            p50_duration_ms: self.duration_percentile_ms(0.50, "P50").ok(),
            p95_duration_ms: self.duration_percentile_ms(0.95, "P95").ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_triggers_and_outcomes() {
        let metrics = CaptureMetrics::new();
        metrics.record_cycle_started(CaptureTrigger::Alarm).unwrap();
        metrics.record_cycle_started(CaptureTrigger::TabActivated).unwrap();
        metrics.record_cycle_started(CaptureTrigger::TabActivated).unwrap();
        metrics.record_outcome(&CaptureOutcome::Skipped(SkipReason::NoUser)).unwrap();
        metrics.record_failure().unwrap();

        let stats = metrics.snapshot();
        assert_eq!(stats.alarm_cycles, 1);
        assert_eq!(stats.tab_cycles, 2);
        assert_eq!(stats.skipped_no_user, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.captured, 0);
        assert_eq!(stats.p50_duration_ms, None);
    }

    #[test]
    fn percentiles_over_recorded_durations() {
        let metrics = CaptureMetrics::new();
        for ms in 1..=100 {
            metrics.record_duration(Duration::from_millis(ms)).unwrap();
        }

        assert_eq!(metrics.duration_percentile_ms(0.0, "min").unwrap(), 1);
        assert_eq!(metrics.duration_percentile_ms(1.0, "max").unwrap(), 100);
        let p95 = metrics.duration_percentile_ms(0.95, "P95").unwrap();
        assert!((94..=96).contains(&p95));
    }

    #[test]
    fn ring_buffer_evicts_oldest() {
        let metrics = CaptureMetrics::new();
        metrics.record_duration(Duration::from_secs(60)).unwrap();
        for _ in 0..MAX_SAMPLES {
            metrics.record_duration(Duration::from_millis(5)).unwrap();
        }

        assert_eq!(metrics.duration_percentile_ms(1.0, "max").unwrap(), 5);
    }

    #[test]
    fn empty_percentile_is_an_error() {
        let metrics = CaptureMetrics::new();
        assert!(matches!(
            metrics.duration_percentile_ms(0.5, "P50"),
            Err(MetricsError::EmptyData { metric: "P50" })
        ));
    }
}
