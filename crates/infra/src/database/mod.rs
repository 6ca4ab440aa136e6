//! SQLite persistence

pub mod kv_store;
pub mod manager;

pub use kv_store::SqliteKvStore;
pub use manager::{DbManager, SqliteConnection};
