//! Health report for the coordinator's components.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Aggregate health of the daemon.
///
/// The daemon is healthy when every *required* component is. Advisory
/// components (e.g. whether a user is signed in) are reported but never make
/// the daemon unhealthy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub healthy: bool,
    pub components: Vec<ComponentHealth>,
    pub checked_at: DateTime<Utc>,
}

impl HealthReport {
    pub fn from_components(components: Vec<ComponentHealth>) -> Self {
        let healthy = components.iter().all(|c| c.healthy || !c.required);
        Self { healthy, components, checked_at: Utc::now() }
    }

    pub fn component(&self, name: &str) -> Option<&ComponentHealth> {
        self.components.iter().find(|c| c.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub name: String,
    pub healthy: bool,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ComponentHealth {
    pub fn healthy(name: impl Into<String>) -> Self {
        Self { name: name.into(), healthy: true, required: true, message: None }
    }

    pub fn unhealthy(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self { name: name.into(), healthy: false, required: true, message: Some(message.into()) }
    }

    /// Reported only; does not affect [`HealthReport::healthy`].
    #[must_use]
    pub fn advisory(mut self) -> Self {
        self.required = false;
        self
    }
}
