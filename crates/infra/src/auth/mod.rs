//! Session adapters

pub mod store_session;

pub use store_session::StoreAuthProvider;
