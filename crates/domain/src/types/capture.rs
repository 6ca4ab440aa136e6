//! Capture cycle types

use serde::{Deserialize, Serialize};

use crate::constants::UNKNOWN_TAB_URL;
use crate::impl_domain_status_conversions;
use crate::types::mapping::{SelectedTask, TaskId};

/// What started a capture cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureTrigger {
    Alarm,
    TabActivated,
    Manual,
}

impl_domain_status_conversions!(CaptureTrigger {
    Alarm => "alarm",
    TabActivated => "tab_activated",
    Manual => "manual",
});

/// Why a cycle ended before capturing anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NoUser,
    TimerStopped,
}

impl_domain_status_conversions!(SkipReason {
    NoUser => "no_user",
    TimerStopped => "timer_stopped",
});

/// URL of the focused tab at the start of a cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveTabSnapshot {
    #[serde(default)]
    pub url: Option<String>,
}

impl ActiveTabSnapshot {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: Some(url.into()) }
    }

    /// The tab URL, or the `"N/A"` placeholder when none is available.
    pub fn url_or_unknown(&self) -> &str {
        self.url.as_deref().filter(|url| !url.is_empty()).unwrap_or(UNKNOWN_TAB_URL)
    }
}

/// Raw screenshot returned by the screenshot source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenshotImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Row inserted into the remote time log for every successful capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureRecord {
    pub task_id: Option<TaskId>,
    pub user_id: String,
    /// Left null; durations are derived from the timer, not per capture.
    pub duration: Option<i64>,
    #[serde(rename = "image")]
    pub image_url: String,
    pub website: String,
}

impl CaptureRecord {
    pub fn new(
        task: &SelectedTask,
        user_id: impl Into<String>,
        image_url: impl Into<String>,
        website: impl Into<String>,
    ) -> Self {
        Self {
            task_id: task.task_id.clone(),
            user_id: user_id.into(),
            duration: None,
            image_url: image_url.into(),
            website: website.into(),
        }
    }
}

/// Everything produced by a completed cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureReceipt {
    pub filename: String,
    pub public_url: String,
    pub task: SelectedTask,
    pub record: CaptureRecord,
}

/// Result of one capture cycle that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    Captured(CaptureReceipt),
    Skipped(SkipReason),
}

impl CaptureOutcome {
    pub const fn is_captured(&self) -> bool {
        matches!(self, Self::Captured(_))
    }
}
