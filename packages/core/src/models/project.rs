//! Project Documents
//!
//! A project is a handful of form fields (title, slug, excerpt, status) plus the
//! ordered block sequence that makes up its body.

use crate::models::{ContentBlock, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Publication status of a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    #[default]
    Draft,
    Published,
    Hidden,
    Scheduled,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 4] = [
        ProjectStatus::Draft,
        ProjectStatus::Published,
        ProjectStatus::Hidden,
        ProjectStatus::Scheduled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Draft => "draft",
            ProjectStatus::Published => "published",
            ProjectStatus::Hidden => "hidden",
            ProjectStatus::Scheduled => "scheduled",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ProjectStatus::Draft),
            "published" => Ok(ProjectStatus::Published),
            "hidden" => Ok(ProjectStatus::Hidden),
            "scheduled" => Ok(ProjectStatus::Scheduled),
            other => Err(ValidationError::UnknownStatus(other.to_string())),
        }
    }
}

/// Document-level form fields of a project
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProjectFields {
    pub title: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub status: ProjectStatus,
}

impl ProjectFields {
    pub fn new(title: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            slug: slug.into(),
            excerpt: None,
            status: ProjectStatus::default(),
        }
    }

    pub fn with_excerpt(mut self, excerpt: impl Into<String>) -> Self {
        self.excerpt = Some(excerpt.into());
        self
    }

    pub fn with_status(mut self, status: ProjectStatus) -> Self {
        self.status = status;
        self
    }
}

/// Persisted snapshot of a project
///
/// `id` is `None` until the project has been created in the record store.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectDocument {
    pub id: Option<String>,
    pub fields: ProjectFields,
    pub blocks: Vec<ContentBlock>,
}

impl ProjectDocument {
    /// Empty, not yet persisted project
    pub fn new(fields: ProjectFields) -> Self {
        Self {
            id: None,
            fields,
            blocks: Vec::new(),
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}
