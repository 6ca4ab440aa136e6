//! Process-local `PersistenceStore` used when `store.kind = "memory"`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use snaptrack_core::PersistenceStore;
use snaptrack_domain::{Result, SnaptrackError, StoreChange, StoreValues};
use tokio::sync::broadcast;

const CHANGE_BUFFER: usize = 256;

pub struct InMemoryStore {
    values: Mutex<BTreeMap<String, Value>>,
    changes: Option<broadcast::Sender<StoreChange>>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANGE_BUFFER);
        Self { values: Mutex::new(BTreeMap::new()), changes: Some(sender) }
    }

    /// Store without a change feed; watchers fall back to polling.
    pub fn without_notifications() -> Self {
        Self { values: Mutex::new(BTreeMap::new()), changes: None }
    }
}

#[async_trait]
impl PersistenceStore for InMemoryStore {
    async fn get(&self, keys: &[&str]) -> Result<StoreValues> {
        let values = self.values.lock();
        Ok(keys
            .iter()
            .filter_map(|key| values.get(*key).map(|value| ((*key).to_string(), value.clone())))
            .collect())
    }

    async fn set(&self, values: StoreValues) -> Result<()> {
        let changes: Vec<StoreChange> = {
            let mut current = self.values.lock();
            values
                .into_iter()
                .filter_map(|(key, value)| {
                    let old_value = current.insert(key.clone(), value.clone());
                    (old_value.as_ref() != Some(&value))
                        .then(|| StoreChange { key, old_value, new_value: Some(value) })
                })
                .collect()
        };

        if let Some(sender) = &self.changes {
            for change in changes {
                let _ = sender.send(change);
            }
        }
        Ok(())
    }

    fn subscribe(&self) -> Result<broadcast::Receiver<StoreChange>> {
        self.changes.as_ref().map(broadcast::Sender::subscribe).ok_or_else(|| {
            SnaptrackError::Unsupported("in-memory store created without change notifications".into())
        })
    }
}
