//! Session read from the `user` store key.
//!
//! The login flow runs elsewhere and hands the signed-in user over through
//! [`AuthProvider::sign_in`]; everything else observes the key.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use snaptrack_core::{AuthProvider, KeyWatcher, PersistenceStore, WatchMode};
use snaptrack_domain::constants::KEY_USER;
use snaptrack_domain::{AuthUser, Result, SnaptrackError, StoreValues};
use tokio::sync::watch;
use tracing::info;

pub struct StoreAuthProvider {
    store: Arc<dyn PersistenceStore>,
    watcher: KeyWatcher<AuthUser>,
}

impl StoreAuthProvider {
    /// Start watching the `user` key. `poll_fallback` is only used when the
    /// store has no change feed.
    pub async fn start(store: Arc<dyn PersistenceStore>, poll_fallback: Duration) -> Result<Self> {
        let watcher = KeyWatcher::spawn(store.clone(), KEY_USER, poll_fallback).await?;
        info!(
            mode = ?watcher.mode(),
            signed_in = watcher.current().is_some(),
            "session watcher started"
        );
        Ok(Self { store, watcher })
    }

    pub fn watch_mode(&self) -> WatchMode {
        self.watcher.mode()
    }

    pub async fn shutdown(self) {
        self.watcher.shutdown().await;
    }
}

#[async_trait]
impl AuthProvider for StoreAuthProvider {
    async fn get_session(&self) -> Result<Option<AuthUser>> {
        let values = self.store.get(&[KEY_USER]).await?;
        Ok(values.get_as(KEY_USER))
    }

    fn on_change(&self) -> watch::Receiver<Option<AuthUser>> {
        self.watcher.receiver()
    }

    async fn sign_in(&self, user: AuthUser) -> Result<()> {
        if user.id.trim().is_empty() {
            return Err(SnaptrackError::InvalidInput("user id must not be empty".to_string()));
        }
        self.store.set(StoreValues::new().with(KEY_USER, &user)?).await?;
        info!(user_id = %user.id, "signed in");
        Ok(())
    }

    async fn sign_out(&self) -> Result<()> {
        self.store.set(StoreValues::new().with(KEY_USER, &Value::Null)?).await?;
        info!("signed out");
        Ok(())
    }
}
