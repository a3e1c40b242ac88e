//! Persistence Error Types

use crate::auth::AuthError;
use crate::forms::FormErrors;
use crate::persistence::SessionState;
use crate::store::{StoreError, UploadError};
use thiserror::Error;

/// Errors surfaced by loading, listing and saving projects
///
/// A failed save never leaves a partial record behind and never changes the
/// editing session's document.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Failed to load project '{id}': {source}")]
    Load { id: String, source: StoreError },

    #[error("Failed to list projects: {0}")]
    List(#[source] StoreError),

    #[error("Failed to save project: {0}")]
    Save(#[source] StoreError),

    #[error("Image upload failed, nothing was saved: {0}")]
    Upload(#[from] UploadError),

    #[error("Invalid project: {0}")]
    Validation(#[from] FormErrors),

    #[error("Content blocks are {size} bytes, the limit is {limit}")]
    TooLarge { size: usize, limit: usize },

    #[error("Malformed content_blocks in project '{id}': {reason}")]
    Malformed { id: String, reason: String },

    #[error("Failed to serialize content blocks: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Editor is not ready (currently {0:?})")]
    NotReady(SessionState),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl PersistenceError {
    pub fn load(id: impl Into<String>, source: StoreError) -> Self {
        Self::Load {
            id: id.into(),
            source,
        }
    }

    pub fn malformed(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            id: id.into(),
            reason: reason.into(),
        }
    }

    pub fn too_large(size: usize, limit: usize) -> Self {
        Self::TooLarge { size, limit }
    }
}
