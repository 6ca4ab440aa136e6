//! Tracing setup and command logging helpers.

use std::time::Duration;

use snaptrack_domain::{LoggingConfig, SnaptrackError};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `logging.level`; `logging.json` switches to JSON
/// lines. Calling this twice is harmless: the second install is ignored.
pub fn init_tracing(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    let installed = if config.json {
        builder.json().with_current_span(true).try_init()
    } else {
        builder.try_init()
    };

    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

/// Log the outcome of a command execution with structured fields.
///
/// Callers must avoid forwarding sensitive values in `command`.
#[inline]
pub fn log_command_execution(command: &str, elapsed: Duration, error: Option<&SnaptrackError>) {
    let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

    match error {
        None => info!(command, duration_ms, "command_execution_success"),
        Some(err) => warn!(
            command,
            duration_ms,
            error_type = error_label(err),
            error = %err,
            "command_execution_failure"
        ),
    }
}

/// Convert a `SnaptrackError` into a stable label suitable for logging.
#[inline]
pub const fn error_label(error: &SnaptrackError) -> &'static str {
    match error {
        SnaptrackError::Store(_) => "store",
        SnaptrackError::Config(_) => "config",
        SnaptrackError::Network(_) => "network",
        SnaptrackError::Auth(_) => "auth",
        SnaptrackError::NotFound(_) => "not_found",
        SnaptrackError::InvalidInput(_) => "invalid_input",
        SnaptrackError::Unsupported(_) => "unsupported",
        SnaptrackError::Internal(_) => "internal",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_stable() {
        assert_eq!(error_label(&SnaptrackError::NotFound("x".into())), "not_found");
        assert_eq!(error_label(&SnaptrackError::InvalidInput("x".into())), "invalid_input");
        assert_eq!(error_label(&SnaptrackError::Store("x".into())), "store");
    }

    #[test]
    fn init_twice_does_not_panic() {
        let config = LoggingConfig::default();
        init_tracing(&config);
        init_tracing(&config);
    }
}
