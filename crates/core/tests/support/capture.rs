//! Fakes for the capture ports

use async_trait::async_trait;
use parking_lot::Mutex;
use snaptrack_core::{ScreenshotSink, ScreenshotSource, TabSource};
use snaptrack_domain::{
    ActiveTabSnapshot, CaptureRecord, Result, ScreenshotImage, SnaptrackError,
};

pub struct FixedTab {
    url: Option<String>,
    fail: bool,
}

impl FixedTab {
    pub fn url(url: &str) -> Self {
        Self { url: Some(url.to_string()), fail: false }
    }

    pub fn none() -> Self {
        Self { url: None, fail: false }
    }

    pub fn failing() -> Self {
        Self { url: None, fail: true }
    }
}

#[async_trait]
impl TabSource for FixedTab {
    async fn active_tab(&self) -> Result<ActiveTabSnapshot> {
        if self.fail {
            return Err(SnaptrackError::Internal("no focused window".into()));
        }
        Ok(ActiveTabSnapshot { url: self.url.clone() })
    }
}

pub struct FakeScreenshots {
    fail: bool,
    calls: Mutex<usize>,
}

impl FakeScreenshots {
    pub fn ok() -> Self {
        Self { fail: false, calls: Mutex::new(0) }
    }

    pub fn failing() -> Self {
        Self { fail: true, calls: Mutex::new(0) }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock()
    }
}

#[async_trait]
impl ScreenshotSource for FakeScreenshots {
    async fn fetch_screenshot(&self) -> Result<ScreenshotImage> {
        *self.calls.lock() += 1;
        if self.fail {
            return Err(SnaptrackError::Network("screenshot service returned 503".into()));
        }
        Ok(ScreenshotImage { bytes: vec![0x89, b'P', b'N', b'G'], content_type: "image/png".into() })
    }
}

/// Sink that records what it receives.
#[derive(Default)]
pub struct RecordingSink {
    fail_upload: bool,
    fail_insert: bool,
    uploads: Mutex<Vec<String>>,
    records: Mutex<Vec<CaptureRecord>>,
}

impl RecordingSink {
    pub fn failing_upload() -> Self {
        Self { fail_upload: true, ..Self::default() }
    }

    pub fn failing_insert() -> Self {
        Self { fail_insert: true, ..Self::default() }
    }

    pub fn uploads(&self) -> Vec<String> {
        self.uploads.lock().clone()
    }

    pub fn records(&self) -> Vec<CaptureRecord> {
        self.records.lock().clone()
    }
}

#[async_trait]
impl ScreenshotSink for RecordingSink {
    async fn upload(&self, filename: &str, _image: &ScreenshotImage) -> Result<String> {
        if self.fail_upload {
            return Err(SnaptrackError::Network("storage upload failed with 500".into()));
        }
        self.uploads.lock().push(filename.to_string());
        Ok(format!("https://cdn.example/public/timetracker/{filename}"))
    }

    async fn insert_record(&self, record: &CaptureRecord) -> Result<()> {
        if self.fail_insert {
            return Err(SnaptrackError::Network("insert rejected".into()));
        }
        self.records.lock().push(record.clone());
        Ok(())
    }
}
