//! Project Dashboard
//!
//! The admin landing page: every project, newest first.

use crate::auth::AuthStore;
use crate::models::ProjectStatus;
use crate::persistence::codec::decode_fields;
use crate::persistence::{PersistenceError, ProjectRepository};
use crate::store::Record;
use chrono::{DateTime, Utc};
use std::fmt;

/// One dashboard row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSummary {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub status: ProjectStatus,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl From<&Record> for ProjectSummary {
    fn from(record: &Record) -> Self {
        let fields = decode_fields(record);
        Self {
            id: record.id.clone(),
            title: fields.title,
            slug: fields.slug,
            status: fields.status,
            created: record.created,
            updated: record.updated,
        }
    }
}

impl fmt::Display for ProjectSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}  {:<9}  {}", self.id, self.status, self.title)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    projects: Vec<ProjectSummary>,
}

impl Dashboard {
    /// List every project; requires an admin session
    pub async fn load(
        auth: &AuthStore,
        repository: &ProjectRepository,
    ) -> Result<Self, PersistenceError> {
        auth.require_admin()?;
        let projects: Vec<ProjectSummary> = repository
            .list()
            .await?
            .iter()
            .map(ProjectSummary::from)
            .collect();
        tracing::debug!("Dashboard lists {} projects", projects.len());
        Ok(Self { projects })
    }

    pub fn projects(&self) -> &[ProjectSummary] {
        &self.projects
    }

    pub fn total(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}
