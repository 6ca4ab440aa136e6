//! Commands exposed to the browser side
//!
//! Each command is a thin wrapper over a service in [`AppContext`] that goes
//! through [`execute_command`](crate::utils::command_helpers::execute_command)
//! for uniform logging.

pub mod capture;
pub mod mappings;
pub mod selection;
pub mod session;
pub mod tabs;
pub mod timer;

pub use capture::{capture_stats, trigger_capture};
pub use mappings::{create_mapping, delete_mapping, list_mappings, refresh_mappings, update_mapping};
pub use selection::{clear_selection, get_selection, set_selection};
pub use session::{get_session, sign_in, sign_out};
pub use tabs::tab_activated;
pub use timer::{handle_message, timer_state};
