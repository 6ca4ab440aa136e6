//! Port interface for the remote URL mapping table

use async_trait::async_trait;
use snaptrack_domain::{MappingId, Result, UrlMapping, UrlMappingDraft};

/// Remote persistence of URL mappings.
#[async_trait]
pub trait UrlMappingRepository: Send + Sync {
    /// All mappings, newest first.
    async fn list_mappings(&self) -> Result<Vec<UrlMapping>>;

    /// Insert a mapping owned by `owner_id` and return the stored row.
    async fn create_mapping(&self, draft: &UrlMappingDraft, owner_id: &str) -> Result<UrlMapping>;

    async fn update_mapping(&self, id: MappingId, draft: &UrlMappingDraft) -> Result<()>;

    async fn delete_mapping(&self, id: MappingId) -> Result<()>;
}
