//! Application constants
//!
//! Centralized location for the store keys, wire names and defaults shared by
//! the background coordinator and its adapters.

// Persistent store keys
pub const KEY_IS_RUNNING: &str = "isRunning";
pub const KEY_SESSION_START: &str = "sessionStart";
pub const KEY_ACCUMULATED_TIME: &str = "accumulatedTime";
pub const KEY_SELECTED_PROJECT: &str = "selectedProject";
pub const KEY_SELECTED_TASK: &str = "selectedTask";
pub const KEY_USER: &str = "user";
pub const KEY_URL_MAPPINGS: &str = "urlMappings";
pub const KEY_SCREENSHOT: &str = "screenshot";

/// Keys written together by every timer transition.
pub const TIMER_KEYS: [&str; 3] = [KEY_IS_RUNNING, KEY_SESSION_START, KEY_ACCUMULATED_TIME];

/// Keys read at the start of every capture cycle.
pub const CAPTURE_CONTEXT_KEYS: [&str; 5] =
    [KEY_SELECTED_PROJECT, KEY_SELECTED_TASK, KEY_USER, KEY_IS_RUNNING, KEY_URL_MAPPINGS];

// Capture defaults
pub const SCREENSHOT_ALARM_NAME: &str = "screenshot-alarm";
pub const DEFAULT_CAPTURE_INTERVAL_MINUTES: u32 = 5;
pub const DEFAULT_SCREENSHOT_ENDPOINT: &str = "http://localhost:5000/screenshot";
pub const DEFAULT_SCREENSHOT_CONTENT_TYPE: &str = "image/png";
pub const SCREENSHOT_FILE_EXTENSION: &str = "png";
/// Placeholder used when the active tab has no readable URL.
pub const UNKNOWN_TAB_URL: &str = "N/A";
/// Placeholder rendered into filenames when the effective task has no id.
pub const UNASSIGNED_TASK_LABEL: &str = "none";
/// Length of the random base-36 suffix appended to screenshot filenames.
pub const FILENAME_SUFFIX_LEN: usize = 10;

// Remote sink defaults
pub const DEFAULT_SCREENSHOT_BUCKET: &str = "timetracker";
pub const DEFAULT_RECORDS_TABLE: &str = "timelogs";
pub const DEFAULT_MAPPINGS_TABLE: &str = "urlmappings";

// Local surfaces
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:7878";
pub const DEFAULT_IDENTITY_POLL_SECS: u64 = 5;
pub const DEFAULT_STORE_PATH: &str = "snaptrack.db";
