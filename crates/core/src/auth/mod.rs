//! Authentication session port

pub mod ports;

pub use ports::AuthProvider;
