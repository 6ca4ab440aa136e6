//! # SnapTrack App
//!
//! Daemon layer - context wiring, commands and the loopback HTTP surface.
//!
//! This crate contains:
//! - Application context (dependency injection)
//! - Commands (browser side → coordinator bridge)
//! - The axum router and server lifecycle
//! - Logging setup
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Wires up the hexagonal architecture
//! - Provides the HTTP routes the popup and mapping page call

pub mod commands;
pub mod context;
pub mod server;
pub mod utils;

// Re-export for convenience
pub use commands::*;
pub use context::*;
pub use server::{router, ApiError, MessageServer};
