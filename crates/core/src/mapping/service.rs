//! URL mapping management
//!
//! Remote rows are the source of truth. After every successful remote call
//! the `urlMappings` store key is rewritten so capture cycles see the change
//! without a network round trip.

use std::sync::Arc;

use snaptrack_domain::constants::KEY_URL_MAPPINGS;
use snaptrack_domain::{
    AuthUser, MappingId, Result, SnaptrackError, StoreValues, UrlMapping, UrlMappingDraft,
};
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use super::ports::UrlMappingRepository;
use crate::auth::AuthProvider;
use crate::store::PersistenceStore;

pub struct UrlMappingService {
    repository: Arc<dyn UrlMappingRepository>,
    store: Arc<dyn PersistenceStore>,
    auth: Arc<dyn AuthProvider>,
    // Serializes read-modify-write of the mirrored list.
    mirror_lock: Mutex<()>,
}

impl UrlMappingService {
    pub fn new(
        repository: Arc<dyn UrlMappingRepository>,
        store: Arc<dyn PersistenceStore>,
        auth: Arc<dyn AuthProvider>,
    ) -> Self {
        Self { repository, store, auth, mirror_lock: Mutex::new(()) }
    }

    /// Reload every mapping from the remote table and mirror it locally.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<Vec<UrlMapping>> {
        let _guard = self.mirror_lock.lock().await;
        let mappings = self.repository.list_mappings().await?;
        self.write_mirror(&mappings).await?;
        info!(count = mappings.len(), "url mappings refreshed");
        Ok(mappings)
    }

    /// Mappings as currently mirrored in the store.
    pub async fn mirrored(&self) -> Result<Vec<UrlMapping>> {
        let values = self.store.get(&[KEY_URL_MAPPINGS]).await?;
        Ok(values.get_list(KEY_URL_MAPPINGS))
    }

    #[instrument(skip(self, draft), fields(url = %draft.url))]
    pub async fn create(&self, draft: UrlMappingDraft) -> Result<UrlMapping> {
        let draft = normalized(draft);
        draft.validate()?;
        let owner = self.require_user().await?;

        let _guard = self.mirror_lock.lock().await;
        let created = self.repository.create_mapping(&draft, &owner.id).await?;

        let mut mappings = self.mirrored().await?;
        mappings.retain(|mapping| mapping.id != created.id);
        mappings.insert(0, created.clone());
        self.write_mirror(&mappings).await?;

        info!(mapping_id = created.id, "url mapping created");
        Ok(created)
    }

    #[instrument(skip(self, draft))]
    pub async fn update(&self, id: MappingId, draft: UrlMappingDraft) -> Result<UrlMapping> {
        let draft = normalized(draft);
        draft.validate()?;
        self.require_user().await?;

        let _guard = self.mirror_lock.lock().await;
        self.repository.update_mapping(id, &draft).await?;

        let mut mappings = self.mirrored().await?;
        if !mappings.iter().any(|mapping| mapping.id == id) {
            warn!(mapping_id = id, "updated mapping missing from mirror, reloading");
            mappings = self.repository.list_mappings().await?;
        }
        let updated = mappings.iter_mut().find(|mapping| mapping.id == id).map(|mapping| {
            mapping.apply(&draft);
            mapping.clone()
        });
        self.write_mirror(&mappings).await?;

        let updated =
            updated.ok_or_else(|| SnaptrackError::NotFound(format!("url mapping {id}")))?;
        info!(mapping_id = id, "url mapping updated");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: MappingId) -> Result<()> {
        self.require_user().await?;

        let _guard = self.mirror_lock.lock().await;
        self.repository.delete_mapping(id).await?;

        let mut mappings = self.mirrored().await?;
        mappings.retain(|mapping| mapping.id != id);
        self.write_mirror(&mappings).await?;

        info!(mapping_id = id, "url mapping deleted");
        Ok(())
    }

    async fn require_user(&self) -> Result<AuthUser> {
        self.auth
            .get_session()
            .await?
            .ok_or_else(|| SnaptrackError::Auth("sign in to manage url mappings".to_string()))
    }

    async fn write_mirror(&self, mappings: &[UrlMapping]) -> Result<()> {
        self.store.set(StoreValues::new().with(KEY_URL_MAPPINGS, mappings)?).await
    }
}

fn normalized(mut draft: UrlMappingDraft) -> UrlMappingDraft {
    draft.title = draft.title.trim().to_string();
    draft.url = draft.url.trim().to_string();
    draft
}
