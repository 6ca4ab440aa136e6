//! Screenshot source adapters

pub mod http_source;

pub use http_source::HttpScreenshotSource;
