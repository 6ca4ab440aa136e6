#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::{json, Value};
use snaptrack_domain::{HttpConfig, SinkConfig};
use snaptrack_infra::database::DbManager;
use snaptrack_infra::{HttpClient, SqliteKvStore, SupabaseClient};
use tempfile::TempDir;

pub const TEST_API_KEY: &str = "anon-test-key";

/// Bytes standing in for a PNG screenshot.
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nfake-image";

/// Route test logs through the libtest writer. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().with_env_filter("debug").try_init();
}

/// Temporary database file that stays alive for the duration of a test.
pub struct TestDatabase {
    pub manager: Arc<DbManager>,
    temp_dir: TempDir,
}

impl TestDatabase {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let manager = DbManager::new(temp_dir.path().join("store.db"), 4)
            .expect("db manager should be created");
        manager.run_migrations().expect("migrations should run");

        Self { manager: Arc::new(manager), temp_dir }
    }

    pub fn path(&self) -> PathBuf {
        self.temp_dir.path().join("store.db")
    }

    pub fn store(&self) -> SqliteKvStore {
        SqliteKvStore::new(self.manager.clone())
    }

    /// Execute a batch of SQL statements against the database.
    pub fn execute_batch(&self, sql: &str) {
        let conn = self.manager.get_connection().expect("connection should be available");
        conn.execute_batch(sql).expect("SQL batch execution should succeed");
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}

pub fn sink_config(base_url: &str) -> SinkConfig {
    SinkConfig {
        base_url: base_url.to_string(),
        api_key: Some(TEST_API_KEY.to_string()),
        ..SinkConfig::default()
    }
}

pub fn http_client() -> HttpClient {
    HttpClient::from_config(&HttpConfig { timeout_secs: 5, max_attempts: 1 })
        .expect("http client should build")
}

pub fn supabase_client(base_url: &str) -> SupabaseClient {
    SupabaseClient::new(http_client(), &sink_config(base_url)).expect("supabase client should build")
}

/// A `urlmappings` row as returned by the REST endpoint.
pub fn mapping_row(id: i64, title: &str, url: &str, task_id: i64) -> Value {
    json!({
        "url_mapping_id": id,
        "team_id": 1,
        "project_id": 2,
        "task_id": task_id,
        "title": title,
        "url": url,
        "owner_id": "user-1",
        "created_at": "2024-05-01T10:00:00+00:00",
        "updated_at": null
    })
}
