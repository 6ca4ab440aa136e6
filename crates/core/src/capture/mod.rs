//! Screenshot capture cycle

pub mod filename;
pub mod ports;
pub mod service;

pub use filename::screenshot_filename;
pub use ports::{ScreenshotSink, ScreenshotSource, TabSource};
pub use service::{CaptureDeps, CaptureService};
