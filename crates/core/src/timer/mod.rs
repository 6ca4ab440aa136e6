//! Persistent start/stop timer

pub mod actor;
pub mod ports;
pub mod service;

pub use actor::{TimerActor, TimerCommand, TimerHandle};
pub use ports::Clock;
pub use service::TimerService;
