//! Focused-tab tracking
//!
//! The browser side reports every tab activation. The tracker remembers the
//! latest URL for [`TabSource`] reads and fans activations out to listeners
//! such as the capture scheduler.

use async_trait::async_trait;
use parking_lot::RwLock;
use snaptrack_core::TabSource;
use snaptrack_domain::{ActiveTabSnapshot, Result};
use tokio::sync::broadcast;
use tracing::debug;

const ACTIVATION_BUFFER: usize = 64;

/// A tab that just gained focus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabActivation {
    pub url: Option<String>,
}

pub struct ActiveTabTracker {
    current: RwLock<Option<String>>,
    activations: broadcast::Sender<TabActivation>,
}

impl Default for ActiveTabTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ActiveTabTracker {
    pub fn new() -> Self {
        let (activations, _) = broadcast::channel(ACTIVATION_BUFFER);
        Self { current: RwLock::new(None), activations }
    }

    /// Record that a tab gained focus. Blank URLs are stored as unknown.
    pub fn activate(&self, url: Option<String>) {
        let url = url.map(|url| url.trim().to_string()).filter(|url| !url.is_empty());
        debug!(url = ?url, "tab activated");
        self.current.write().clone_from(&url);
        // Nobody listening is fine.
        let _ = self.activations.send(TabActivation { url });
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TabActivation> {
        self.activations.subscribe()
    }

    pub fn current_url(&self) -> Option<String> {
        self.current.read().clone()
    }
}

#[async_trait]
impl TabSource for ActiveTabTracker {
    async fn active_tab(&self) -> Result<ActiveTabSnapshot> {
        Ok(ActiveTabSnapshot { url: self.current_url() })
    }
}
