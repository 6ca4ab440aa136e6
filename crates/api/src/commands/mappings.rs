//! URL mapping management commands

use snaptrack_domain::{MappingId, Result, UrlMapping, UrlMappingDraft};

use crate::context::AppContext;
use crate::utils::command_helpers::execute_command;

/// Mappings as currently mirrored in the local store.
pub async fn list_mappings(ctx: &AppContext) -> Result<Vec<UrlMapping>> {
    execute_command("mappings::list", || ctx.mappings.mirrored()).await
}

/// Reload mappings from the remote table.
pub async fn refresh_mappings(ctx: &AppContext) -> Result<Vec<UrlMapping>> {
    execute_command("mappings::refresh", || ctx.mappings.refresh()).await
}

pub async fn create_mapping(ctx: &AppContext, draft: UrlMappingDraft) -> Result<UrlMapping> {
    execute_command("mappings::create", || ctx.mappings.create(draft)).await
}

pub async fn update_mapping(ctx: &AppContext, id: MappingId, draft: UrlMappingDraft) -> Result<UrlMapping> {
    execute_command("mappings::update", || ctx.mappings.update(id, draft)).await
}

pub async fn delete_mapping(ctx: &AppContext, id: MappingId) -> Result<()> {
    execute_command("mappings::delete", || ctx.mappings.delete(id)).await
}
