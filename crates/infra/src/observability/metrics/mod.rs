//! Metrics collection modules

pub mod capture;

pub use capture::{CaptureMetrics, CaptureStats};
