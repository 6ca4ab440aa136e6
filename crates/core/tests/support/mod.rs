//! Shared test helpers for `snaptrack-core` integration tests.
//!
//! In-memory fakes for every core port so tests can drive the services
//! deterministically.
#![allow(dead_code)]

pub mod auth;
pub mod capture;
pub mod clock;
pub mod mapping;
pub mod store;
