//! Propagates one store key into a `watch` channel.
//!
//! Values set by an external flow (e.g. the login page writing `user`) reach
//! long-lived consumers through change notifications. Stores without
//! notifications are polled at a bounded interval instead.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use snaptrack_domain::{Result, SnaptrackError, StoreValues};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::ports::PersistenceStore;

/// How the watcher learns about changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchMode {
    Subscription,
    Polling(Duration),
}

/// Background task mirroring a single key into a [`watch::Receiver`].
pub struct KeyWatcher<T> {
    receiver: watch::Receiver<Option<T>>,
    mode: WatchMode,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> KeyWatcher<T>
where
    T: DeserializeOwned + PartialEq + Clone + Send + Sync + 'static,
{
    /// Read the current value and start following `key`.
    pub async fn spawn(
        store: Arc<dyn PersistenceStore>,
        key: impl Into<String>,
        poll_fallback: Duration,
    ) -> Result<Self> {
        let key = key.into();
        let initial = read_key::<T>(store.as_ref(), &key).await?;
        let (sender, receiver) = watch::channel(initial);
        let cancel = CancellationToken::new();

        let (mode, handle) = match store.subscribe() {
            Ok(changes) => {
                let task = follow_changes(store, key, changes, sender, cancel.clone());
                (WatchMode::Subscription, tokio::spawn(task))
            }
            Err(SnaptrackError::Unsupported(reason)) => {
                debug!(key = %key, reason = %reason, "store has no change feed, polling");
                let period = poll_fallback.max(Duration::from_millis(10));
                let task = poll_key(store, key, period, sender, cancel.clone());
                (WatchMode::Polling(period), tokio::spawn(task))
            }
            Err(err) => return Err(err),
        };

        Ok(Self { receiver, mode, cancel, handle: Some(handle), _marker: PhantomData })
    }

    pub fn receiver(&self) -> watch::Receiver<Option<T>> {
        self.receiver.clone()
    }

    pub fn current(&self) -> Option<T> {
        self.receiver.borrow().clone()
    }

    pub const fn mode(&self) -> WatchMode {
        self.mode
    }

    /// Stop the background task and wait for it to exit.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.await {
                warn!(error = %err, "key watcher task failed");
            }
        }
    }
}

impl<T> Drop for KeyWatcher<T> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn read_key<T: DeserializeOwned>(store: &dyn PersistenceStore, key: &str) -> Result<Option<T>> {
    let values = store.get(&[key]).await?;
    Ok(values.get_as::<T>(key))
}

fn publish<T: PartialEq>(sender: &watch::Sender<Option<T>>, value: Option<T>) {
    sender.send_if_modified(|current| {
        if *current == value {
            false
        } else {
            *current = value;
            true
        }
    });
}

async fn follow_changes<T>(
    store: Arc<dyn PersistenceStore>,
    key: String,
    mut changes: broadcast::Receiver<snaptrack_domain::StoreChange>,
    sender: watch::Sender<Option<T>>,
    cancel: CancellationToken,
) where
    T: DeserializeOwned + PartialEq,
{
    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            change = changes.recv() => match change {
                Ok(change) if change.key == key => {
                    let mut values = StoreValues::new();
                    if let Some(value) = change.new_value {
                        values.insert_value(key.as_str(), value);
                    }
                    publish(&sender, values.get_as::<T>(&key));
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(key = %key, skipped, "change feed lagged, re-reading key");
                    match read_key::<T>(store.as_ref(), &key).await {
                        Ok(value) => publish(&sender, value),
                        Err(err) => warn!(key = %key, error = %err, "failed to re-read key"),
                    }
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!(key = %key, "change feed closed");
                    break;
                }
            },
        }
    }
}

async fn poll_key<T>(
    store: Arc<dyn PersistenceStore>,
    key: String,
    period: Duration,
    sender: watch::Sender<Option<T>>,
    cancel: CancellationToken,
) where
    T: DeserializeOwned + PartialEq,
{
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // The first tick completes immediately and the initial value is already
    // published.
    ticker.tick().await;

    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            _ = ticker.tick() => match read_key::<T>(store.as_ref(), &key).await {
                Ok(value) => publish(&sender, value),
                Err(err) => warn!(key = %key, error = %err, "failed to poll key"),
            },
        }
    }
}
