//! Pure helper functions

pub mod origin;

pub use origin::extract_domain;
