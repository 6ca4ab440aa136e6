//! Port interface for the persistent key-value store
//!
//! The store survives process restarts and is shared with the browser side,
//! which owns most keys. The core writes only the timer keys and the latest
//! screenshot pointer.

use async_trait::async_trait;
use snaptrack_domain::{Result, StoreChange, StoreValues};
use tokio::sync::broadcast;

/// Durable key-value store with change notifications
#[async_trait]
pub trait PersistenceStore: Send + Sync {
    /// Read the given keys. Keys that were never written are absent from the
    /// result.
    async fn get(&self, keys: &[&str]) -> Result<StoreValues>;

    /// Write all `values` atomically: readers observe either none or all of
    /// them.
    async fn set(&self, values: StoreValues) -> Result<()>;

    /// Subscribe to change notifications, one per changed key.
    ///
    /// Stores that cannot push changes return
    /// [`SnaptrackError::Unsupported`](snaptrack_domain::SnaptrackError::Unsupported).
    fn subscribe(&self) -> Result<broadcast::Receiver<StoreChange>>;
}
