//! URL → task mappings

pub mod ports;
pub mod resolver;
pub mod service;

pub use ports::UrlMappingRepository;
pub use resolver::{find_mapping, resolve_task};
pub use service::UrlMappingService;
