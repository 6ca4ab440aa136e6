//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If the required variables are missing, falls back to a config file
//! 3. Probes multiple paths for config files (JSON or TOML)
//! 4. With no file either, starts from built-in defaults
//!
//! Optional variables override whichever source was used.
//!
//! ## Environment Variables
//! Required for environment-only configuration:
//! - `SNAPTRACK_STORE_PATH`: SQLite store file path
//! - `SNAPTRACK_SINK_URL`: Base URL of the remote storage/records service
//!
//! Optional:
//! - `SNAPTRACK_SINK_API_KEY`: API key sent to the remote service
//! - `SNAPTRACK_CAPTURE_INTERVAL_MINUTES`: Alarm period in minutes
//! - `SNAPTRACK_SCREENSHOT_ENDPOINT`: URL of the screenshot service
//! - `SNAPTRACK_BIND_ADDR`: Listen address of the local message server
//! - `SNAPTRACK_LOG_LEVEL`: Default log filter
//! - `SNAPTRACK_LOG_JSON`: Emit JSON logs (true/false)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.{json,toml}` and `./snaptrack.{json,toml}`
//! 2. The same names one and two directories up
//! 3. The same names next to the executable

use std::path::{Path, PathBuf};

use snaptrack_domain::{Config, Result, SnaptrackError};

pub const ENV_STORE_PATH: &str = "SNAPTRACK_STORE_PATH";
pub const ENV_SINK_URL: &str = "SNAPTRACK_SINK_URL";
pub const ENV_SINK_API_KEY: &str = "SNAPTRACK_SINK_API_KEY";
pub const ENV_CAPTURE_INTERVAL: &str = "SNAPTRACK_CAPTURE_INTERVAL_MINUTES";
pub const ENV_SCREENSHOT_ENDPOINT: &str = "SNAPTRACK_SCREENSHOT_ENDPOINT";
pub const ENV_BIND_ADDR: &str = "SNAPTRACK_BIND_ADDR";
pub const ENV_LOG_LEVEL: &str = "SNAPTRACK_LOG_LEVEL";
pub const ENV_LOG_JSON: &str = "SNAPTRACK_LOG_JSON";

const CONFIG_FILE_NAMES: [&str; 4] = ["config.json", "config.toml", "snaptrack.json", "snaptrack.toml"];

/// Load configuration with automatic fallback strategy.
///
/// # Errors
/// Returns `SnaptrackError::Config` if an optional variable has an invalid
/// value or a probed config file cannot be parsed.
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            match probe_config_paths() {
                Some(path) => load_from_file(Some(path)),
                None => {
                    tracing::info!("No config file found, using defaults");
                    let mut config = Config::default();
                    apply_env_overrides(&mut config)?;
                    Ok(config)
                }
            }
        }
    }
}

/// Load configuration from environment variables.
///
/// # Errors
/// Returns `SnaptrackError::Config` if a required variable is missing or a
/// value is invalid.
pub fn load_from_env() -> Result<Config> {
    let mut config = Config::default();
    config.store.path = env_var(ENV_STORE_PATH)?;
    config.sink.base_url = env_var(ENV_SINK_URL)?;
    apply_env_overrides(&mut config)?;
    Ok(config)
}

/// Load configuration from a file, then apply optional environment
/// overrides.
///
/// If `path` is `None`, probes the standard locations.
///
/// # Errors
/// Returns `SnaptrackError::Config` if the file is missing, unreadable or
/// malformed.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(SnaptrackError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            SnaptrackError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| SnaptrackError::Config(format!("Failed to read config file: {e}")))?;

    let mut config = parse_config(&contents, &config_path)?;
    apply_env_overrides(&mut config)?;
    Ok(config)
}

/// Apply the optional `SNAPTRACK_*` variables on top of `config`.
///
/// # Errors
/// Returns `SnaptrackError::Config` for unparseable values, or when the
/// resulting capture interval does not divide the hour.
pub fn apply_env_overrides(config: &mut Config) -> Result<()> {
    if let Some(path) = env_opt(ENV_STORE_PATH) {
        config.store.path = path;
    }
    if let Some(url) = env_opt(ENV_SINK_URL) {
        config.sink.base_url = url;
    }
    if let Some(key) = env_opt(ENV_SINK_API_KEY) {
        config.sink.api_key = Some(key);
    }
    if let Some(raw) = env_opt(ENV_CAPTURE_INTERVAL) {
        config.capture.interval_minutes = raw
            .parse::<u32>()
            .map_err(|_| SnaptrackError::Config(format!("Invalid capture interval: {raw} (expected minutes)")))?;
    }
    if let Some(endpoint) = env_opt(ENV_SCREENSHOT_ENDPOINT) {
        config.capture.screenshot_endpoint = endpoint;
    }
    if let Some(addr) = env_opt(ENV_BIND_ADDR) {
        config.server.bind_addr = addr;
    }
    if let Some(level) = env_opt(ENV_LOG_LEVEL) {
        config.logging.level = level;
    }
    config.logging.json = env_bool(ENV_LOG_JSON, config.logging.json);
    config.capture.validate()
}

/// Parse configuration from string content; format is detected by file
/// extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents).map_err(|e| SnaptrackError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| SnaptrackError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(SnaptrackError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe the standard locations and return the first existing config file.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.extend([cwd.clone(), cwd.join(".."), cwd.join("../..")]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.extend([exe_dir.to_path_buf(), exe_dir.join(".."), exe_dir.join("../..")]);
        }
    }

    roots
        .iter()
        .flat_map(|root| CONFIG_FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

fn env_var(key: &str) -> Result<String> {
    env_opt(key).ok_or_else(|| SnaptrackError::Config(format!("Missing required environment variable: {key}")))
}

/// Set and non-blank variable.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

/// Parse boolean from environment variable.
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map_or(default, |s| matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use snaptrack_domain::StoreKind;
    use tempfile::NamedTempFile;

    use super::*;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const ALL_VARS: [&str; 8] = [
        ENV_STORE_PATH,
        ENV_SINK_URL,
        ENV_SINK_API_KEY,
        ENV_CAPTURE_INTERVAL,
        ENV_SCREENSHOT_ENDPOINT,
        ENV_BIND_ADDR,
        ENV_LOG_LEVEL,
        ENV_LOG_JSON,
    ];

    fn clear_env() {
        for key in ALL_VARS {
            std::env::remove_var(key);
        }
    }

    fn temp_config(contents: &str, extension: &str) -> (NamedTempFile, PathBuf) {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(contents.as_bytes()).unwrap();
        let path = temp_file.path().with_extension(extension);
        std::fs::copy(temp_file.path(), &path).unwrap();
        (temp_file, path)
    }

    #[test]
    fn env_bool_parsing() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);

        for value in ["1", "true", "yes", "on", "TRUE"] {
            std::env::set_var("SNAPTRACK_TEST_BOOL", value);
            assert!(env_bool("SNAPTRACK_TEST_BOOL", false), "{value}");
        }
        for value in ["0", "false", "no", "off"] {
            std::env::set_var("SNAPTRACK_TEST_BOOL", value);
            assert!(!env_bool("SNAPTRACK_TEST_BOOL", true), "{value}");
        }
        std::env::remove_var("SNAPTRACK_TEST_BOOL");
        assert!(env_bool("SNAPTRACK_TEST_BOOL", true));
    }

    #[test]
    fn load_from_env_with_all_vars() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        clear_env();
        std::env::set_var(ENV_STORE_PATH, "/tmp/snaptrack.db");
        std::env::set_var(ENV_SINK_URL, "https://project.supabase.co");
        std::env::set_var(ENV_SINK_API_KEY, "anon-key");
        std::env::set_var(ENV_CAPTURE_INTERVAL, "10");
        std::env::set_var(ENV_SCREENSHOT_ENDPOINT, "http://127.0.0.1:6000/shot");
        std::env::set_var(ENV_BIND_ADDR, "127.0.0.1:9000");
        std::env::set_var(ENV_LOG_LEVEL, "debug");
        std::env::set_var(ENV_LOG_JSON, "true");

        let config = load_from_env().expect("config from env");
        clear_env();

        assert_eq!(config.store.path, "/tmp/snaptrack.db");
        assert_eq!(config.sink.base_url, "https://project.supabase.co");
        assert_eq!(config.sink.api_key.as_deref(), Some("anon-key"));
        assert_eq!(config.capture.interval_minutes, 10);
        assert_eq!(config.capture.cron_expression(), "0 */10 * * * *");
        assert_eq!(config.capture.screenshot_endpoint, "http://127.0.0.1:6000/shot");
        assert_eq!(config.server.bind_addr, "127.0.0.1:9000");
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn load_from_env_requires_store_and_sink() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        clear_env();
        std::env::set_var(ENV_STORE_PATH, "/tmp/snaptrack.db");

        let result = load_from_env();
        clear_env();

        assert!(matches!(result, Err(SnaptrackError::Config(msg)) if msg.contains(ENV_SINK_URL)));
    }

    #[test]
    fn invalid_interval_is_rejected() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        clear_env();
        std::env::set_var(ENV_STORE_PATH, "/tmp/snaptrack.db");
        std::env::set_var(ENV_SINK_URL, "https://project.supabase.co");

        for raw in ["0", "7", "60", "five"] {
            std::env::set_var(ENV_CAPTURE_INTERVAL, raw);
            assert!(matches!(load_from_env(), Err(SnaptrackError::Config(_))), "{raw}");
        }
        clear_env();
    }

    #[test]
    fn file_interval_that_does_not_divide_the_hour_is_rejected() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        clear_env();
        let (_temp, path) = temp_config(r#"{ "capture": { "interval_minutes": 7 } }"#, "json");

        let result = load_from_file(Some(path.clone()));
        std::fs::remove_file(path).ok();

        assert!(matches!(result, Err(SnaptrackError::Config(msg)) if msg.contains("must divide 60")));
    }

    #[test]
    fn load_from_json_file() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        clear_env();
        let (_temp, path) = temp_config(
            r#"{
                "store": { "kind": "memory" },
                "capture": { "interval_minutes": 2 },
                "sink": { "base_url": "https://sink.example", "bucket": "shots" }
            }"#,
            "json",
        );

        let config = load_from_file(Some(path.clone())).expect("config from json");
        std::fs::remove_file(path).ok();

        assert_eq!(config.store.kind, StoreKind::Memory);
        assert_eq!(config.capture.interval_minutes, 2);
        assert_eq!(config.sink.bucket, "shots");
        assert_eq!(config.sink.records_table, "timelogs");
        assert_eq!(config.server.bind_addr, "127.0.0.1:7878");
    }

    #[test]
    fn load_from_toml_file_with_env_override() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        clear_env();
        std::env::set_var(ENV_SINK_API_KEY, "from-env");
        let (_temp, path) = temp_config(
            r#"
[store]
path = "data/snaptrack.db"
pool_size = 2

[http]
timeout_secs = 10
"#,
            "toml",
        );

        let config = load_from_file(Some(path.clone())).expect("config from toml");
        std::fs::remove_file(path).ok();
        clear_env();

        assert_eq!(config.store.path, "data/snaptrack.db");
        assert_eq!(config.store.pool_size, 2);
        assert_eq!(config.http.timeout_secs, 10);
        assert_eq!(config.http.max_attempts, 1);
        assert_eq!(config.sink.api_key.as_deref(), Some("from-env"));
    }

    #[test]
    fn load_from_missing_file_fails() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/config.json")));
        assert!(matches!(result, Err(SnaptrackError::Config(_))));
    }

    #[test]
    fn invalid_json_is_rejected() {
        let result = parse_config(r#"{ "store": "#, Path::new("config.json"));
        assert!(matches!(result, Err(SnaptrackError::Config(msg)) if msg.contains("JSON")));
    }

    #[test]
    fn unsupported_format_is_rejected() {
        let result = parse_config("store: {}", Path::new("config.yaml"));
        assert!(result.is_err());
    }
}
