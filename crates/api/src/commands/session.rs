//! Session hand-off from the login flow

use snaptrack_core::AuthProvider;
use snaptrack_domain::{AuthUser, Result};

use crate::context::AppContext;
use crate::utils::command_helpers::execute_command;

pub async fn get_session(ctx: &AppContext) -> Result<Option<AuthUser>> {
    execute_command("session::get", || ctx.auth.get_session()).await
}

/// Record the user the login flow authenticated. Capture cycles and mapping
/// edits start working as soon as this lands.
pub async fn sign_in(ctx: &AppContext, user: AuthUser) -> Result<AuthUser> {
    execute_command("session::sign_in", || async {
        ctx.auth.sign_in(user.clone()).await?;
        Ok(user)
    })
    .await
}

pub async fn sign_out(ctx: &AppContext) -> Result<()> {
    execute_command("session::sign_out", || ctx.auth.sign_out()).await
}
