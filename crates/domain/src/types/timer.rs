//! Timer state machine
//!
//! The timer is persisted as three flat store keys (`isRunning`,
//! `sessionStart`, `accumulatedTime`). In memory it is an enum so that a
//! running timer always carries its session start.

use serde::{Deserialize, Serialize};

use crate::constants::{KEY_ACCUMULATED_TIME, KEY_IS_RUNNING, KEY_SESSION_START};
use crate::errors::Result;
use crate::impl_domain_status_conversions;
use crate::types::store::StoreValues;

/// Coarse timer phase, mostly for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerPhase {
    Stopped,
    Running,
}

impl_domain_status_conversions!(TimerPhase {
    Stopped => "stopped",
    Running => "running",
});

/// Timer state. All times are Unix milliseconds, durations are milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TimerState {
    Stopped { accumulated_ms: i64 },
    Running { accumulated_ms: i64, session_start_ms: i64 },
}

impl Default for TimerState {
    fn default() -> Self {
        Self::Stopped { accumulated_ms: 0 }
    }
}

impl TimerState {
    pub const fn phase(&self) -> TimerPhase {
        match self {
            Self::Stopped { .. } => TimerPhase::Stopped,
            Self::Running { .. } => TimerPhase::Running,
        }
    }

    pub const fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }

    pub const fn accumulated_ms(&self) -> i64 {
        match self {
            Self::Stopped { accumulated_ms } | Self::Running { accumulated_ms, .. } => {
                *accumulated_ms
            }
        }
    }

    pub const fn session_start_ms(&self) -> Option<i64> {
        match self {
            Self::Stopped { .. } => None,
            Self::Running { session_start_ms, .. } => Some(*session_start_ms),
        }
    }

    /// Start a stopped timer or fold the live session of a running one into
    /// the accumulated total.
    #[must_use]
    pub fn toggled(self, now_ms: i64) -> Self {
        match self {
            Self::Stopped { accumulated_ms } => {
                Self::Running { accumulated_ms, session_start_ms: now_ms }
            }
            Self::Running { accumulated_ms, session_start_ms } => Self::Stopped {
                accumulated_ms: accumulated_ms.saturating_add(session_span(session_start_ms, now_ms)),
            },
        }
    }

    /// Total tracked time as of `now_ms`.
    pub fn elapsed_ms(&self, now_ms: i64) -> i64 {
        match *self {
            Self::Stopped { accumulated_ms } => accumulated_ms,
            Self::Running { accumulated_ms, session_start_ms } => {
                accumulated_ms.saturating_add(session_span(session_start_ms, now_ms))
            }
        }
    }

    /// Rebuild the state from its persisted form, repairing torn records.
    ///
    /// `isRunning` without a session start cannot be timed and is read as
    /// stopped; negative totals are clamped to zero.
    pub fn from_persisted(persisted: PersistedTimer) -> Self {
        let accumulated_ms = persisted.accumulated_time.max(0);
        if persisted.is_running && persisted.session_start > 0 {
            Self::Running { accumulated_ms, session_start_ms: persisted.session_start }
        } else {
            Self::Stopped { accumulated_ms }
        }
    }

    pub const fn to_persisted(&self) -> PersistedTimer {
        match *self {
            Self::Stopped { accumulated_ms } => PersistedTimer {
                is_running: false,
                session_start: 0,
                accumulated_time: accumulated_ms,
            },
            Self::Running { accumulated_ms, session_start_ms } => PersistedTimer {
                is_running: true,
                session_start: session_start_ms,
                accumulated_time: accumulated_ms,
            },
        }
    }

    /// Read the timer from a store snapshot. Absent fields default to
    /// `0`/`false`.
    pub fn from_store(values: &StoreValues) -> Self {
        Self::from_persisted(PersistedTimer {
            is_running: values.bool_or(KEY_IS_RUNNING, false),
            session_start: values.i64_or(KEY_SESSION_START, 0),
            accumulated_time: values.i64_or(KEY_ACCUMULATED_TIME, 0),
        })
    }

    /// All three timer keys, to be written in a single `set`.
    pub fn to_store_values(&self) -> Result<StoreValues> {
        let persisted = self.to_persisted();
        StoreValues::new()
            .with(KEY_IS_RUNNING, &persisted.is_running)?
            .with(KEY_SESSION_START, &persisted.session_start)?
            .with(KEY_ACCUMULATED_TIME, &persisted.accumulated_time)
    }
}

/// Flat persisted form of [`TimerState`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedTimer {
    pub is_running: bool,
    /// Unix milliseconds, `0` when unset.
    pub session_start: i64,
    pub accumulated_time: i64,
}

/// Length of the session `[start, now]`; zero if the clock went backwards.
fn session_span(start_ms: i64, now_ms: i64) -> i64 {
    now_ms.saturating_sub(start_ms).max(0)
}
