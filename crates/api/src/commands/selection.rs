//! Manual project/task selection commands

use snaptrack_core::Selection;
use snaptrack_domain::Result;

use crate::context::AppContext;
use crate::utils::command_helpers::execute_command;

pub async fn get_selection(ctx: &AppContext) -> Result<Selection> {
    execute_command("selection::get", || ctx.selection.current()).await
}

pub async fn set_selection(ctx: &AppContext, selection: Selection) -> Result<Selection> {
    execute_command("selection::set", || async {
        ctx.selection.select(&selection).await?;
        Ok(selection)
    })
    .await
}

pub async fn clear_selection(ctx: &AppContext) -> Result<()> {
    execute_command("selection::clear", || ctx.selection.clear()).await
}
