//! Store Error Types
//!
//! Errors raised by record stores and file storage backends. The persistence
//! layer wraps them; front ends only ever see their `Display` text.

use std::path::PathBuf;
use thiserror::Error;

/// Record store failures
#[derive(Error, Debug)]
pub enum StoreError {
    /// No record with this id in the collection
    #[error("Record '{id}' not found in collection '{collection}'")]
    NotFound { collection: String, id: String },

    /// The store refused the write (validation, permissions)
    #[error("Store rejected write to '{collection}': {reason}")]
    Rejected { collection: String, reason: String },

    /// Malformed query arguments (sort order, collection name)
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// The backend could not be reached
    #[error("Store unavailable: {0}")]
    Transport(String),

    /// A stored file could not be read back as records
    #[error("Corrupt collection file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn not_found(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            collection: collection.into(),
            id: id.into(),
        }
    }

    pub fn rejected(collection: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Rejected {
            collection: collection.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_query(msg: impl Into<String>) -> Self {
        Self::InvalidQuery(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn corrupt(path: PathBuf, source: serde_json::Error) -> Self {
        Self::Corrupt { path, source }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// File storage failures, always naming the file involved
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Cannot upload empty file '{file_name}'")]
    Empty { file_name: String },

    #[error("Upload of '{file_name}' rejected: {reason}")]
    Rejected { file_name: String, reason: String },

    #[error("Upload of '{file_name}' failed: {reason}")]
    Transport { file_name: String, reason: String },

    #[error("Failed to store '{file_name}': {source}")]
    Io {
        file_name: String,
        source: std::io::Error,
    },
}

impl UploadError {
    pub fn empty(file_name: impl Into<String>) -> Self {
        Self::Empty {
            file_name: file_name.into(),
        }
    }

    pub fn rejected(file_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Rejected {
            file_name: file_name.into(),
            reason: reason.into(),
        }
    }

    pub fn transport(file_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Transport {
            file_name: file_name.into(),
            reason: reason.into(),
        }
    }

    pub fn io(file_name: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            file_name: file_name.into(),
            source,
        }
    }

    /// Name of the file whose upload failed
    pub fn file_name(&self) -> &str {
        match self {
            Self::Empty { file_name }
            | Self::Rejected { file_name, .. }
            | Self::Transport { file_name, .. }
            | Self::Io { file_name, .. } => file_name,
        }
    }
}
