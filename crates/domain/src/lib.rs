//! # SnapTrack Domain
//!
//! Business domain types and models for SnapTrack.
//!
//! This crate contains:
//! - Timer, mapping and capture types
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Store key constants and pure URL utilities
//!
//! ## Architecture
//! - No dependencies on other SnapTrack crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
pub use utils::origin::extract_domain;
