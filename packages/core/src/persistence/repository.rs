//! Project Repository
//!
//! Loads and saves projects against a [`RecordStore`], uploading pending
//! images through a [`FileStorage`] first.
//!
//! # Save protocol
//!
//! 1. Validate the form fields; nothing is contacted when they are invalid
//! 2. Check the serialized block sequence against the size cap
//! 3. Upload every pending image concurrently and wait for all of them
//! 4. Swap each pending upload for its URL
//! 5. Write title, slug, excerpt, status and `content_blocks` in one
//!    `create` (no id yet) or `update` call
//!
//! Any failure in steps 1-4 returns before the record store is written to.
//! Files already uploaded when a sibling upload fails stay in storage.

use crate::config::{FolioConfig, DEFAULT_MAX_CONTENT_BLOCKS_BYTES, DEFAULT_PROJECTS_COLLECTION};
use crate::forms::validate_project;
use crate::models::{ContentBlock, DraftBlock, ProjectDocument, ProjectFields};
use crate::persistence::codec::{decode_project, encode_blocks, encode_fields, encoded_len};
use crate::persistence::PersistenceError;
use crate::store::{FileStorage, Record, RecordStore, SortSpec, UploadError};
use futures::future::try_join_all;
use serde_json::Value;
use std::sync::Arc;

pub struct ProjectRepository {
    records: Arc<dyn RecordStore>,
    files: Arc<dyn FileStorage>,
    collection: String,
    max_content_blocks_bytes: usize,
}

impl ProjectRepository {
    pub fn new(records: Arc<dyn RecordStore>, files: Arc<dyn FileStorage>) -> Self {
        Self {
            records,
            files,
            collection: DEFAULT_PROJECTS_COLLECTION.to_string(),
            max_content_blocks_bytes: DEFAULT_MAX_CONTENT_BLOCKS_BYTES,
        }
    }

    pub fn from_config(
        config: &FolioConfig,
        records: Arc<dyn RecordStore>,
        files: Arc<dyn FileStorage>,
    ) -> Self {
        Self::new(records, files)
            .with_collection(config.projects_collection.clone())
            .with_max_content_blocks_bytes(config.max_content_blocks_bytes)
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    pub fn with_max_content_blocks_bytes(mut self, limit: usize) -> Self {
        self.max_content_blocks_bytes = limit;
        self
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Fetch and decode project `id`
    pub async fn load(&self, id: &str) -> Result<ProjectDocument, PersistenceError> {
        let record = self
            .records
            .get_one(&self.collection, id)
            .await
            .map_err(|e| PersistenceError::load(id, e))?;

        let project = decode_project(&record)?;
        tracing::info!(
            "Loaded project {} with {} blocks",
            id,
            project.blocks.len()
        );
        Ok(project)
    }

    /// Every project record, newest first
    pub async fn list(&self) -> Result<Vec<Record>, PersistenceError> {
        self.records
            .get_full_list(&self.collection, Some(&SortSpec::newest_first()))
            .await
            .map_err(PersistenceError::List)
    }

    /// Persist a project, creating it when `id` is `None`
    ///
    /// Returns the project as stored: its id, and blocks carrying the uploaded
    /// URLs instead of pending uploads.
    pub async fn save(
        &self,
        id: Option<&str>,
        fields: &ProjectFields,
        blocks: &[DraftBlock],
    ) -> Result<ProjectDocument, PersistenceError> {
        validate_project(fields)?;
        self.check_size(&encode_blocks(blocks.iter().map(DraftBlock::block))?)?;

        let pending = blocks
            .iter()
            .filter(|b| b.pending_upload().is_some())
            .count();
        if pending > 0 {
            tracing::info!("Uploading {} pending images", pending);
        }

        let resolved = resolve_uploads(self.files.as_ref(), blocks).await?;
        let content_blocks = encode_blocks(&resolved)?;
        self.check_size(&content_blocks)?;

        let payload = encode_fields(fields, content_blocks);
        let record = match id {
            Some(id) => self.records.update(&self.collection, id, payload).await,
            None => self.records.create(&self.collection, payload).await,
        }
        .map_err(PersistenceError::Save)?;

        tracing::info!(
            "Saved project {} ({} blocks)",
            record.id,
            resolved.len()
        );
        Ok(ProjectDocument {
            id: Some(record.id),
            fields: fields.clone(),
            blocks: resolved,
        })
    }

    fn check_size(&self, content_blocks: &Value) -> Result<(), PersistenceError> {
        let size = encoded_len(content_blocks)?;
        if size > self.max_content_blocks_bytes {
            return Err(PersistenceError::too_large(
                size,
                self.max_content_blocks_bytes,
            ));
        }
        Ok(())
    }
}

/// Upload every pending image concurrently and return the persistable blocks
///
/// Fails with the first upload error; on success the result has the same
/// length and order as `blocks`.
pub async fn resolve_uploads(
    files: &dyn FileStorage,
    blocks: &[DraftBlock],
) -> Result<Vec<ContentBlock>, UploadError> {
    let uploads = blocks.iter().map(|block| async move {
        match block.pending_upload() {
            Some(file) => {
                let url = files.upload(file).await?;
                tracing::debug!("Uploaded {} for block {}", file.file_name(), block.id());
                Ok::<_, UploadError>(block.clone().resolve(url))
            }
            None => Ok(block.block().clone()),
        }
    });

    try_join_all(uploads).await.map_err(|e| {
        tracing::warn!("Upload of {} failed: {}", e.file_name(), e);
        e
    })
}
