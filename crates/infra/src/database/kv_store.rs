//! SQLite-backed `PersistenceStore`
//!
//! Each key is one row holding a JSON document. A `set` runs in a single
//! immediate transaction, and only keys whose value actually changed are
//! broadcast to subscribers after commit.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, OptionalExtension, TransactionBehavior};
use serde_json::Value;
use snaptrack_core::PersistenceStore;
use snaptrack_domain::{Result, SnaptrackError, StoreChange, StoreValues};
use tokio::sync::broadcast;
use tokio::task;
use tracing::{debug, warn};

use super::manager::{map_sql_error, DbManager};

const CHANGE_BUFFER: usize = 256;

pub struct SqliteKvStore {
    db: Arc<DbManager>,
    changes: broadcast::Sender<StoreChange>,
}

impl SqliteKvStore {
    /// Wrap a migrated database.
    pub fn new(db: Arc<DbManager>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_BUFFER);
        Self { db, changes }
    }

    /// Open the database at `path`, run migrations and wrap it.
    pub fn open(path: impl AsRef<std::path::Path>, pool_size: u32) -> Result<Self> {
        let db = DbManager::new(path, pool_size)?;
        db.run_migrations()?;
        Ok(Self::new(Arc::new(db)))
    }
}

#[async_trait]
impl PersistenceStore for SqliteKvStore {
    async fn get(&self, keys: &[&str]) -> Result<StoreValues> {
        let db = self.db.clone();
        let keys: Vec<String> = keys.iter().map(|key| (*key).to_string()).collect();

        task::spawn_blocking(move || -> Result<StoreValues> {
            let conn = db.get_connection()?;
            let mut stmt =
                conn.prepare_cached("SELECT value FROM kv_store WHERE key = ?1").map_err(map_sql_error)?;

            let mut values = StoreValues::new();
            for key in keys {
                let raw: Option<String> =
                    stmt.query_row(params![key], |row| row.get(0)).optional().map_err(map_sql_error)?;
                let Some(raw) = raw else { continue };
                match serde_json::from_str::<Value>(&raw) {
                    Ok(value) => values.insert_value(key, value),
                    Err(err) => warn!(key = %key, error = %err, "skipping undecodable store value"),
                }
            }
            Ok(values)
        })
        .await
        .map_err(|err| SnaptrackError::Internal(format!("store read task failed: {err}")))?
    }

    async fn set(&self, values: StoreValues) -> Result<()> {
        if values.is_empty() {
            return Ok(());
        }
        let db = self.db.clone();

        let changes = task::spawn_blocking(move || -> Result<Vec<StoreChange>> {
            let mut conn = db.get_connection()?;
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate).map_err(map_sql_error)?;
            let now = Utc::now().timestamp_millis();
            let mut changes = Vec::new();
            {
                let mut select =
                    tx.prepare_cached("SELECT value FROM kv_store WHERE key = ?1").map_err(map_sql_error)?;
                let mut upsert = tx
                    .prepare_cached(
                        "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
                         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                    )
                    .map_err(map_sql_error)?;

                for (key, value) in values {
                    let previous: Option<String> =
                        select.query_row(params![key], |row| row.get(0)).optional().map_err(map_sql_error)?;
                    let old_value = previous.and_then(|raw| serde_json::from_str::<Value>(&raw).ok());
                    if old_value.as_ref() == Some(&value) {
                        continue;
                    }

                    let encoded = serde_json::to_string(&value)
                        .map_err(|err| SnaptrackError::Internal(format!("failed to encode '{key}': {err}")))?;
                    upsert.execute(params![key, encoded, now]).map_err(map_sql_error)?;
                    changes.push(StoreChange { key, old_value, new_value: Some(value) });
                }
            }
            tx.commit().map_err(map_sql_error)?;
            Ok(changes)
        })
        .await
        .map_err(|err| SnaptrackError::Internal(format!("store write task failed: {err}")))??;

        debug!(changed = changes.len(), "store values written");
        for change in changes {
            // No subscribers is not an error.
            let _ = self.changes.send(change);
        }
        Ok(())
    }

    fn subscribe(&self) -> Result<broadcast::Receiver<StoreChange>> {
        Ok(self.changes.subscribe())
    }
}
