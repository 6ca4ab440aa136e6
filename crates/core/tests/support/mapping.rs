use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use snaptrack_core::UrlMappingRepository;
use snaptrack_domain::{MappingId, Result, SnaptrackError, UrlMapping, UrlMappingDraft};

/// Remote mapping table held in memory, newest first.
pub struct FakeMappingRepository {
    rows: Mutex<Vec<UrlMapping>>,
    next_id: AtomicI64,
    calls: AtomicUsize,
    pub fail: bool,
}

impl FakeMappingRepository {
    pub fn new(rows: Vec<UrlMapping>) -> Self {
        let next = rows.iter().map(|row| row.id).max().unwrap_or(0) + 1;
        Self { rows: Mutex::new(rows), next_id: AtomicI64::new(next), calls: AtomicUsize::new(0), fail: false }
    }

    pub fn failing() -> Self {
        Self { fail: true, ..Self::new(Vec::new()) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn rows(&self) -> Vec<UrlMapping> {
        self.rows.lock().clone()
    }

    fn enter(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(SnaptrackError::Network("remote table unavailable".into()));
        }
        Ok(())
    }
}

pub fn row(id: MappingId, url: &str, task_id: i64, title: &str) -> UrlMapping {
    UrlMapping {
        id,
        team_id: None,
        project_id: None,
        task_id: Some(task_id.into()),
        title: title.to_string(),
        url: Some(url.to_string()),
        owner_id: Some("user-1".into()),
        created_at: None,
        updated_at: None,
    }
}

#[async_trait]
impl UrlMappingRepository for FakeMappingRepository {
    async fn list_mappings(&self) -> Result<Vec<UrlMapping>> {
        self.enter()?;
        Ok(self.rows())
    }

    async fn create_mapping(&self, draft: &UrlMappingDraft, owner_id: &str) -> Result<UrlMapping> {
        self.enter()?;
        let mut created = row(self.next_id.fetch_add(1, Ordering::SeqCst), &draft.url, 0, &draft.title);
        created.apply(draft);
        created.owner_id = Some(owner_id.to_string());
        self.rows.lock().insert(0, created.clone());
        Ok(created)
    }

    async fn update_mapping(&self, id: MappingId, draft: &UrlMappingDraft) -> Result<()> {
        self.enter()?;
        if let Some(existing) = self.rows.lock().iter_mut().find(|row| row.id == id) {
            existing.apply(draft);
        }
        Ok(())
    }

    async fn delete_mapping(&self, id: MappingId) -> Result<()> {
        self.enter()?;
        self.rows.lock().retain(|row| row.id != id);
        Ok(())
    }
}
