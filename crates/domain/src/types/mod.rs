//! Domain types and models

pub mod capture;
pub mod mapping;
pub mod store;
pub mod timer;
pub mod user;

pub use capture::{
    ActiveTabSnapshot, CaptureOutcome, CaptureReceipt, CaptureRecord, CaptureTrigger,
    ScreenshotImage, SkipReason,
};
pub use mapping::{
    EntityId, MappingId, NewUrlMapping, ProjectId, SelectedProject, SelectedTask, TaskId, TeamId,
    UrlMapping, UrlMappingDraft,
};
pub use store::{StoreChange, StoreValues};
pub use timer::{PersistedTimer, TimerPhase, TimerState};
pub use user::AuthUser;
