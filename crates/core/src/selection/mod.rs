//! Manual task selection

pub mod service;

pub use service::{Selection, SelectionService};
