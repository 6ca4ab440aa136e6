//! Task selection and URL → task mapping types

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, SnaptrackError};
use crate::utils::origin::is_http_url;

/// Identifier of a remote entity (team, project, task).
///
/// The remote store hands out integer keys while some UI paths carry them as
/// strings; both forms are kept exactly as received.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Numeric(i64),
    Text(String),
}

pub type TaskId = EntityId;
pub type ProjectId = EntityId;
pub type TeamId = EntityId;

/// Primary key of a URL mapping row.
pub type MappingId = i64;

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for EntityId {
    fn from(value: i64) -> Self {
        Self::Numeric(value)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// The task a screenshot is attributed to: the user's manual choice, or the
/// task of a matching URL mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedTask {
    #[serde(default)]
    pub task_id: Option<TaskId>,
    #[serde(default)]
    pub title: Option<String>,
}

impl SelectedTask {
    pub fn new(task_id: impl Into<TaskId>, title: impl Into<String>) -> Self {
        Self { task_id: Some(task_id.into()), title: Some(title.into()) }
    }

    /// Nothing selected; records produced with it carry a null task id.
    pub fn unassigned() -> Self {
        Self::default()
    }
}

/// Project chosen alongside the selected task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedProject {
    pub project_id: ProjectId,
    #[serde(default)]
    pub name: Option<String>,
}

/// User-defined rule associating a URL origin with a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlMapping {
    #[serde(rename = "url_mapping_id", alias = "id")]
    pub id: MappingId,
    #[serde(default)]
    pub team_id: Option<TeamId>,
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    #[serde(default)]
    pub task_id: Option<TaskId>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl UrlMapping {
    /// Task this mapping assigns captures to.
    pub fn as_selected_task(&self) -> SelectedTask {
        SelectedTask { task_id: self.task_id.clone(), title: Some(self.title.clone()) }
    }

    /// Overwrite the editable fields with those of `draft`.
    pub fn apply(&mut self, draft: &UrlMappingDraft) {
        self.title.clone_from(&draft.title);
        self.url = Some(draft.url.clone());
        self.team_id.clone_from(&draft.team_id);
        self.project_id.clone_from(&draft.project_id);
        self.task_id.clone_from(&draft.task_id);
    }
}

/// Editable fields of a mapping as submitted by the management surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlMappingDraft {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub team_id: Option<TeamId>,
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    #[serde(default)]
    pub task_id: Option<TaskId>,
}

impl UrlMappingDraft {
    /// Reject blank titles and URLs that are not absolute http(s) URLs.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(SnaptrackError::InvalidInput("mapping title must not be empty".into()));
        }
        if !is_http_url(self.url.trim()) {
            return Err(SnaptrackError::InvalidInput(format!(
                "mapping url must be an http(s) URL with a host: {}",
                self.url
            )));
        }
        Ok(())
    }
}

/// Insert payload: the draft plus the owning user.
#[derive(Debug, Clone, Serialize)]
pub struct NewUrlMapping<'a> {
    #[serde(flatten)]
    pub draft: &'a UrlMappingDraft,
    pub owner_id: &'a str,
}
