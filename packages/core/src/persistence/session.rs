//! Editor Session
//!
//! One [`EditorSession`] drives the editing of one project:
//!
//! ```text
//! existing project:  Loading ──load──▶ Ready ──save──▶ Saving ──▶ Ready
//! new project:                         Ready ──save──▶ Saving ──▶ Ready
//! ```
//!
//! A failed load leaves the session in `Loading` with an empty document; a
//! failed save returns to `Ready` with the document exactly as it was.
//! `save` borrows the session mutably, so no edit can interleave with it. A
//! save whose future is dropped mid-flight also returns to `Ready`; uploads it
//! already made stay in file storage.

use crate::auth::AuthStore;
use crate::editor::DocumentState;
use crate::models::ProjectFields;
use crate::persistence::{PersistenceError, ProjectRepository};
use crate::render::{apply_change, BlockChange};
use std::fmt;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Buffered events per subscriber before the oldest are dropped
pub const SESSION_EVENT_CAPACITY: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Loading,
    Ready,
    Saving,
}

/// Notifications for front ends observing a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Loaded { project_id: String },
    Saved { project_id: String, created: bool },
    SaveFailed { message: String },
}

pub struct EditorSession {
    repository: Arc<ProjectRepository>,
    state: SessionState,
    project_id: Option<String>,
    fields: ProjectFields,
    document: DocumentState,
    events: broadcast::Sender<SessionEvent>,
}

impl EditorSession {
    fn with_state(
        repository: Arc<ProjectRepository>,
        state: SessionState,
        project_id: Option<String>,
    ) -> Self {
        let (events, _) = broadcast::channel(SESSION_EVENT_CAPACITY);
        Self {
            repository,
            state,
            project_id,
            fields: ProjectFields::default(),
            document: DocumentState::new(),
            events,
        }
    }

    /// Session for a project that does not exist yet; starts `Ready`
    pub fn new_project(
        repository: Arc<ProjectRepository>,
        auth: &AuthStore,
    ) -> Result<Self, PersistenceError> {
        auth.require_admin()?;
        Ok(Self::with_state(repository, SessionState::Ready, None))
    }

    /// Session for an existing project; starts `Loading` until [`load`](Self::load)
    pub fn for_project(
        repository: Arc<ProjectRepository>,
        auth: &AuthStore,
        id: impl Into<String>,
    ) -> Result<Self, PersistenceError> {
        auth.require_admin()?;
        Ok(Self::with_state(
            repository,
            SessionState::Loading,
            Some(id.into()),
        ))
    }

    /// [`for_project`](Self::for_project) followed by [`load`](Self::load)
    pub async fn open(
        repository: Arc<ProjectRepository>,
        auth: &AuthStore,
        id: impl Into<String>,
    ) -> Result<Self, PersistenceError> {
        let mut session = Self::for_project(repository, auth, id)?;
        session.load().await?;
        Ok(session)
    }

    /// Fetch the project and enter `Ready`
    ///
    /// Only valid while `Loading`; may be retried after a failure.
    pub async fn load(&mut self) -> Result<(), PersistenceError> {
        let id = match (&self.state, &self.project_id) {
            (SessionState::Loading, Some(id)) => id.clone(),
            _ => return Err(PersistenceError::NotReady(self.state)),
        };

        let project = self.repository.load(&id).await?;
        self.fields = project.fields;
        self.document = DocumentState::from_blocks(project.blocks);
        self.state = SessionState::Ready;
        self.emit(SessionEvent::Loaded { project_id: id });
        Ok(())
    }

    /// Upload pending images and write the project
    ///
    /// On success the document is replaced by the stored version and a new
    /// project acquires its id. On failure nothing changes.
    pub async fn save(&mut self) -> Result<(), PersistenceError> {
        if self.state != SessionState::Ready {
            return Err(PersistenceError::NotReady(self.state));
        }

        let saving = SavingGuard::enter(&mut self.state);
        let result = self
            .repository
            .save(
                self.project_id.as_deref(),
                &self.fields,
                self.document.blocks(),
            )
            .await;
        drop(saving);

        match result {
            Ok(saved) => {
                let created = self.project_id.is_none();
                self.project_id = saved.id;
                self.document = DocumentState::from_blocks(saved.blocks);
                if let Some(id) = &self.project_id {
                    self.emit(SessionEvent::Saved {
                        project_id: id.clone(),
                        created,
                    });
                }
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Save failed: {}", e);
                self.emit(SessionEvent::SaveFailed {
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    pub fn is_new(&self) -> bool {
        self.project_id.is_none()
    }

    pub fn fields(&self) -> &ProjectFields {
        &self.fields
    }

    pub fn document(&self) -> &DocumentState {
        &self.document
    }

    pub fn fields_mut(&mut self) -> Result<&mut ProjectFields, PersistenceError> {
        self.ensure_ready()?;
        Ok(&mut self.fields)
    }

    pub fn document_mut(&mut self) -> Result<&mut DocumentState, PersistenceError> {
        self.ensure_ready()?;
        Ok(&mut self.document)
    }

    /// Forward a view's change into the document
    pub fn apply(&mut self, change: BlockChange) -> Result<bool, PersistenceError> {
        Ok(apply_change(self.document_mut()?, change))
    }

    fn ensure_ready(&self) -> Result<(), PersistenceError> {
        match self.state {
            SessionState::Ready => Ok(()),
            other => Err(PersistenceError::NotReady(other)),
        }
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

/// Holds a session in `Saving`; back to `Ready` on drop
struct SavingGuard<'a> {
    state: &'a mut SessionState,
}

impl<'a> SavingGuard<'a> {
    fn enter(state: &'a mut SessionState) -> Self {
        *state = SessionState::Saving;
        Self { state }
    }
}

impl Drop for SavingGuard<'_> {
    fn drop(&mut self) {
        *self.state = SessionState::Ready;
    }
}

impl fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorSession")
            .field("state", &self.state)
            .field("project_id", &self.project_id)
            .field("fields", &self.fields)
            .field("blocks", &self.document.len())
            .finish_non_exhaustive()
    }
}
