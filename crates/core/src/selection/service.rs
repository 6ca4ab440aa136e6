//! Manual project/task selection

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use snaptrack_domain::constants::{KEY_SELECTED_PROJECT, KEY_SELECTED_TASK};
use snaptrack_domain::{Result, SelectedProject, SelectedTask, StoreValues};
use tracing::{debug, instrument};

use crate::store::PersistenceStore;

/// The user's current manual choice. Either part may be unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    #[serde(default)]
    pub project: Option<SelectedProject>,
    #[serde(default)]
    pub task: Option<SelectedTask>,
}

pub struct SelectionService {
    store: Arc<dyn PersistenceStore>,
}

impl SelectionService {
    pub fn new(store: Arc<dyn PersistenceStore>) -> Self {
        Self { store }
    }

    /// Store project and task together; `None` clears the key.
    #[instrument(skip(self, selection))]
    pub async fn select(&self, selection: &Selection) -> Result<()> {
        let values = StoreValues::new()
            .with(KEY_SELECTED_PROJECT, &selection.project)?
            .with(KEY_SELECTED_TASK, &selection.task)?;
        self.store.set(values).await?;
        debug!(
            project = ?selection.project.as_ref().map(|p| p.project_id.to_string()),
            task = ?selection.task.as_ref().and_then(|t| t.task_id.as_ref()).map(ToString::to_string),
            "selection stored"
        );
        Ok(())
    }

    pub async fn clear(&self) -> Result<()> {
        self.select(&Selection::default()).await
    }

    /// Current selection; malformed entries read as unset.
    pub async fn current(&self) -> Result<Selection> {
        let values = self.store.get(&[KEY_SELECTED_PROJECT, KEY_SELECTED_TASK]).await?;
        Ok(Selection {
            project: values.get_as(KEY_SELECTED_PROJECT),
            task: values.get_as(KEY_SELECTED_TASK),
        })
    }
}
