//! Port interfaces for the capture cycle

use async_trait::async_trait;
use snaptrack_domain::{ActiveTabSnapshot, CaptureRecord, Result, ScreenshotImage};

/// Reports the focused browser tab.
#[async_trait]
pub trait TabSource: Send + Sync {
    async fn active_tab(&self) -> Result<ActiveTabSnapshot>;
}

/// Produces a screenshot of the user's screen.
#[async_trait]
pub trait ScreenshotSource: Send + Sync {
    async fn fetch_screenshot(&self) -> Result<ScreenshotImage>;
}

/// Remote destination for screenshots and their time-log records.
#[async_trait]
pub trait ScreenshotSink: Send + Sync {
    /// Upload the image under `filename` and return its public URL.
    async fn upload(&self, filename: &str, image: &ScreenshotImage) -> Result<String>;

    async fn insert_record(&self, record: &CaptureRecord) -> Result<()>;
}
