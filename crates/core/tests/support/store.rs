//! In-memory `PersistenceStore`

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use snaptrack_core::PersistenceStore;
use snaptrack_domain::{Result, SnaptrackError, StoreChange, StoreValues};
use tokio::sync::broadcast;

/// Map-backed store. Optionally pushes change notifications.
pub struct MemoryStore {
    values: Mutex<BTreeMap<String, Value>>,
    changes: Option<broadcast::Sender<StoreChange>>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(64);
        Self::build(Some(sender))
    }

    /// A store whose `subscribe` returns `Unsupported`.
    pub fn without_notifications() -> Self {
        Self::build(None)
    }

    fn build(changes: Option<broadcast::Sender<StoreChange>>) -> Self {
        Self {
            values: Mutex::new(BTreeMap::new()),
            changes,
            fail_writes: AtomicBool::new(false),
            writes: AtomicUsize::new(0),
        }
    }

    pub fn seed(&self, key: &str, value: Value) {
        self.values.lock().insert(key.to_string(), value);
    }

    pub fn value(&self, key: &str) -> Option<Value> {
        self.values.lock().get(key).cloned()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PersistenceStore for MemoryStore {
    async fn get(&self, keys: &[&str]) -> Result<StoreValues> {
        let values = self.values.lock();
        Ok(keys
            .iter()
            .filter_map(|key| values.get(*key).map(|value| ((*key).to_string(), value.clone())))
            .collect())
    }

    async fn set(&self, values: StoreValues) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(SnaptrackError::Store("write rejected".into()));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);

        let mut changes = Vec::new();
        {
            let mut current = self.values.lock();
            for (key, value) in values {
                let old_value = current.insert(key.clone(), value.clone());
                if old_value.as_ref() != Some(&value) {
                    changes.push(StoreChange { key, old_value, new_value: Some(value) });
                }
            }
        }
        if let Some(sender) = &self.changes {
            for change in changes {
                let _ = sender.send(change);
            }
        }
        Ok(())
    }

    fn subscribe(&self) -> Result<broadcast::Receiver<StoreChange>> {
        self.changes
            .as_ref()
            .map(broadcast::Sender::subscribe)
            .ok_or_else(|| SnaptrackError::Unsupported("memory store without notifications".into()))
    }
}
