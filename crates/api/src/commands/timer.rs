//! Timer message commands

use snaptrack_core::{dispatch, BackgroundRequest, BackgroundResponse};
use snaptrack_domain::{Result, TimerState};

use crate::context::AppContext;
use crate::utils::command_helpers::execute_command;

/// Handle a `TOGGLE_TIMER` / `GET_ELAPSED_TIME` message.
pub async fn handle_message(ctx: &AppContext, request: BackgroundRequest) -> Result<BackgroundResponse> {
    let name = match request {
        BackgroundRequest::ToggleTimer => "timer::toggle",
        BackgroundRequest::GetElapsedTime => "timer::elapsed",
    };
    execute_command(name, || dispatch(&ctx.timer, request)).await
}

pub async fn timer_state(ctx: &AppContext) -> Result<TimerState> {
    execute_command("timer::state", || ctx.timer.state()).await
}
