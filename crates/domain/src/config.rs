//! Configuration management

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BIND_ADDR, DEFAULT_CAPTURE_INTERVAL_MINUTES, DEFAULT_IDENTITY_POLL_SECS,
    DEFAULT_MAPPINGS_TABLE, DEFAULT_RECORDS_TABLE, DEFAULT_SCREENSHOT_BUCKET,
    DEFAULT_SCREENSHOT_CONTENT_TYPE, DEFAULT_SCREENSHOT_ENDPOINT, DEFAULT_STORE_PATH,
};
use crate::errors::{Result, SnaptrackError};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub capture: CaptureConfig,
    pub sink: SinkConfig,
    pub http: HttpConfig,
    pub server: ServerConfig,
    pub identity: IdentityConfig,
    pub logging: LoggingConfig,
}

/// Which persistent store backs the coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    Sqlite,
    /// Non-durable store, useful for demos and tests
    Memory,
}

/// Local key-value store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub kind: StoreKind,
    pub path: String,
    pub pool_size: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { kind: StoreKind::Sqlite, path: DEFAULT_STORE_PATH.to_string(), pool_size: 4 }
    }
}

/// Screenshot capture configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub interval_minutes: u32,
    pub screenshot_endpoint: String,
    pub content_type: String,
    pub enabled: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            interval_minutes: DEFAULT_CAPTURE_INTERVAL_MINUTES,
            screenshot_endpoint: DEFAULT_SCREENSHOT_ENDPOINT.to_string(),
            content_type: DEFAULT_SCREENSHOT_CONTENT_TYPE.to_string(),
            enabled: true,
        }
    }
}

impl CaptureConfig {
    /// Six-field cron expression firing every `interval_minutes`.
    ///
    /// A `*/N` minute field restarts at the top of each hour, so the period
    /// is only even when `N` divides 60; see [`validate`](Self::validate).
    pub fn cron_expression(&self) -> String {
        format!("0 */{} * * * *", self.interval_minutes.clamp(1, 59))
    }

    /// Reject intervals the minute-field cron cannot fire evenly.
    ///
    /// # Errors
    /// Returns `SnaptrackError::Config` unless `interval_minutes` is between
    /// 1 and 59 and divides 60.
    pub fn validate(&self) -> Result<()> {
        let minutes = self.interval_minutes;
        if (1..=59).contains(&minutes) && 60 % minutes == 0 {
            return Ok(());
        }
        Err(SnaptrackError::Config(format!(
            "Invalid capture interval: {minutes} minutes (must divide 60, e.g. 1, 5, 10, 15, 30)"
        )))
    }
}

/// Remote storage + record sink configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    pub base_url: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub bucket: String,
    pub records_table: String,
    pub mappings_table: String,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            base_url: "https://localhost:3000".to_string(),
            api_key: None,
            bucket: DEFAULT_SCREENSHOT_BUCKET.to_string(),
            records_table: DEFAULT_RECORDS_TABLE.to_string(),
            mappings_table: DEFAULT_MAPPINGS_TABLE.to_string(),
        }
    }
}

/// Outbound HTTP configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    /// Total attempts per request. Capture cycles do not retry, so this
    /// defaults to a single attempt.
    pub max_attempts: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 30, max_attempts: 1 }
    }
}

/// Loopback message server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_addr: DEFAULT_BIND_ADDR.to_string() }
    }
}

/// Identity propagation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Poll period used only when the store cannot deliver change events.
    pub poll_fallback_secs: u64,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self { poll_fallback_secs: DEFAULT_IDENTITY_POLL_SECS }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}
