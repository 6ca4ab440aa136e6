//! Observability infrastructure for capture metrics
//!
//! ## Design Principles
//!
//! 1. **Poison Recovery**: mutex locks recover the inner data on poison and
//!    log a warning instead of panicking.
//!
//! 2. **Future-Proof Returns**: record methods return `MetricsResult<()>` so
//!    limits or validation can be added without breaking callers. They
//!    currently always succeed.
//!
//! 3. **Ring Buffers**: `VecDeque` for O(1) eviction of old samples.

pub mod metrics;

/// Metrics error type
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Empty data set - cannot calculate aggregate metric
    #[error("Empty data: cannot calculate {metric}")]
    EmptyData {
        /// Metric name that failed (e.g., "P95", "average")
        metric: &'static str,
    },
}

/// Result type for metrics operations
pub type MetricsResult<T> = Result<T, MetricsError>;
