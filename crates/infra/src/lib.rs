//! # SnapTrack Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - Key-value store implementations (SQLite, in-memory)
//! - HTTP client and the Supabase storage/REST integration
//! - Host adapters (wall clock, active tab tracking, screenshot endpoint)
//! - The cron-driven capture scheduler and capture metrics
//!
//! ## Architecture
//! - Implements traits defined in `snaptrack-core`
//! - Depends on `snaptrack-domain` and `snaptrack-core`
//! - Contains all "impure" code (I/O, timers, network)

pub mod auth;
pub mod capture;
pub mod config;
pub mod database;
pub mod errors;
pub mod http;
pub mod integrations;
pub mod observability;
pub mod platform;
pub mod scheduling;
pub mod store;

// Re-export commonly used items
pub use auth::StoreAuthProvider;
pub use capture::HttpScreenshotSource;
pub use database::{DbManager, SqliteKvStore};
pub use errors::InfraError;
pub use http::HttpClient;
pub use integrations::SupabaseClient;
pub use observability::metrics::capture::{CaptureMetrics, CaptureStats};
pub use platform::{ActiveTabTracker, SystemClock};
pub use scheduling::{CaptureScheduler, CaptureSchedulerConfig};
pub use store::InMemoryStore;
