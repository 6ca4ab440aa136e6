//! Scheduling infrastructure for capture cycles
//!
//! The capture scheduler follows the same runtime rules as every other
//! background task:
//! - Explicit lifecycle management (start/stop)
//! - Join handles for spawned tasks
//! - Cancellation token support
//! - Timeouts on start, stop and join (never on a capture cycle)

pub mod capture_scheduler;
pub mod error;

pub use capture_scheduler::{CaptureJob, CaptureScheduler, CaptureSchedulerConfig};
pub use error::{SchedulerError, SchedulerResult};
