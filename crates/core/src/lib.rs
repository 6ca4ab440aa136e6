//! # SnapTrack Core
//!
//! Business logic of the background coordinator with no infrastructure
//! dependencies.
//!
//! This crate contains:
//! - Port interfaces (traits) for the store, session, clock, tabs, screenshot
//!   source and remote sink
//! - The timer service and the actor that serializes it
//! - The capture cycle, mapping resolution and mapping management
//!
//! Adapters live in `snaptrack-infra`.

pub mod auth;
pub mod capture;
pub mod mapping;
pub mod messaging;
pub mod selection;
pub mod store;
pub mod timer;

pub use auth::AuthProvider;
pub use capture::{CaptureDeps, CaptureService, ScreenshotSink, ScreenshotSource, TabSource};
pub use mapping::{resolve_task, UrlMappingRepository, UrlMappingService};
pub use messaging::{dispatch, BackgroundRequest, BackgroundResponse};
pub use selection::{Selection, SelectionService};
pub use store::{KeyWatcher, PersistenceStore, WatchMode};
pub use timer::{Clock, TimerActor, TimerHandle, TimerService};
