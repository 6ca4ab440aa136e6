//! Host adapters: wall clock and browser tab focus tracking

pub mod clock;
pub mod tabs;

pub use clock::SystemClock;
pub use tabs::ActiveTabTracker;
