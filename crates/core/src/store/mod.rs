//! Persistent store port and helpers

pub mod ports;
pub mod watcher;

pub use ports::PersistenceStore;
pub use watcher::{KeyWatcher, WatchMode};
