//! Folio Core
//!
//! Block-based content editing for portfolio projects: the block model, the
//! in-memory document being edited, type-specific editing views, and the
//! persistence adapter that uploads images and writes projects to a record
//! store.
//!
//! # Architecture
//!
//! - **Tagged blocks**: one sum type per block payload, with unknown types
//!   kept verbatim as opaque blocks
//! - **Draft wrapper**: picked-but-not-uploaded images live on `DraftBlock`,
//!   which cannot be serialized
//! - **Pure reordering**: drag-and-drop is a function of (sequence, source, target)
//! - **All-or-nothing saves**: uploads fan out concurrently; any failure
//!   aborts before the record is written
//!
//! # Modules
//!
//! - [`models`] - Blocks, drafts and project documents
//! - [`editor`] - Document state manager and reorder engine
//! - [`render`] - Block view dispatch
//! - [`persistence`] - Load, save and the editing session state machine
//! - [`store`] - Record store and file storage traits plus backends
//! - [`auth`] - Admin sessions
//! - [`forms`] - Project and login form validation
//! - [`dashboard`] - Project listing
//! - [`config`] - Configuration loading

pub mod auth;
pub mod config;
pub mod dashboard;
pub mod editor;
pub mod forms;
pub mod models;
pub mod persistence;
pub mod render;
pub mod store;

// Re-export commonly used types
pub use auth::{AuthError, AuthProvider, AuthStore, LocalAuthProvider, Session};
pub use config::{AdminCredentials, ConfigError, FolioConfig};
pub use dashboard::{Dashboard, ProjectSummary};
pub use editor::{DocumentState, DELETE_CONFIRMATION_PROMPT};
pub use forms::{FormErrors, LoginForm};
pub use models::*;
pub use persistence::{
    EditorSession, PersistenceError, ProjectRepository, SessionEvent, SessionState,
};
pub use render::{apply_change, render, BlockChange, BlockView};
pub use store::{FileStorage, RecordStore, StoreError, UploadError};
