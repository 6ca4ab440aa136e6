//! Command execution helpers
//!
//! Every surface command goes through [`execute_command`] so timing and
//! outcome logging stay uniform.

use std::future::Future;
use std::time::Instant;

use snaptrack_domain::Result as DomainResult;

use crate::utils::logging::log_command_execution;

/// Run a command, then log its duration and outcome.
///
/// # Example
///
/// ```rust,ignore
/// pub async fn toggle(ctx: &AppContext) -> Result<TimerState> {
///     execute_command("timer::toggle", || async { ctx.timer.toggle().await }).await
/// }
/// ```
pub async fn execute_command<F, Fut, T>(command_name: &str, command_fn: F) -> DomainResult<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = DomainResult<T>>,
{
    let start = Instant::now();
    let result = command_fn().await;
    log_command_execution(command_name, start.elapsed(), result.as_ref().err());
    result
}
