//! Draft Blocks
//!
//! While a project is being edited, image blocks may carry a file that has been
//! picked but not uploaded yet. That transient state lives in [`DraftBlock`],
//! which wraps a persisted [`ContentBlock`] and deliberately does not implement
//! `Serialize`: the only way to reach the serializer is through
//! [`DraftBlock::into_block`] or [`DraftBlock::resolve`], both of which drop the
//! pending file.

use crate::models::{BlockContent, BlockKind, ContentBlock, ImageContent};
use std::fmt;
use std::sync::Arc;

/// A picked file waiting to be uploaded on the next save
#[derive(Clone, PartialEq, Eq)]
pub struct PendingUpload {
    file_name: String,
    content_type: Option<String>,
    data: Arc<[u8]>,
}

impl PendingUpload {
    pub fn new(file_name: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            data: data.into(),
        }
    }

    /// Attach a MIME type (e.g. `image/png`)
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl fmt::Debug for PendingUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// Complete replacement payload for a block, as produced by an editing view
///
/// `pending_upload` is only meaningful for image content; it is ignored for
/// every other kind.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftContent {
    pub content: BlockContent,
    pub pending_upload: Option<PendingUpload>,
}

impl DraftContent {
    pub fn new(content: BlockContent) -> Self {
        Self {
            content,
            pending_upload: None,
        }
    }

    pub fn with_pending_upload(mut self, upload: Option<PendingUpload>) -> Self {
        self.pending_upload = upload;
        self
    }
}

impl From<BlockContent> for DraftContent {
    fn from(content: BlockContent) -> Self {
        Self::new(content)
    }
}

/// A block as held by the editor: persisted state plus an optional pending upload
#[derive(Debug, Clone, PartialEq)]
pub struct DraftBlock {
    block: ContentBlock,
    pending_upload: Option<PendingUpload>,
}

impl DraftBlock {
    /// Fresh block of the given kind with default content
    pub fn new(kind: BlockKind) -> Self {
        ContentBlock::new(kind).into()
    }

    pub fn id(&self) -> &str {
        self.block.id()
    }

    pub fn content(&self) -> &BlockContent {
        self.block.content()
    }

    pub fn kind(&self) -> Option<BlockKind> {
        self.block.kind()
    }

    pub fn tag(&self) -> &str {
        self.block.tag()
    }

    pub fn pending_upload(&self) -> Option<&PendingUpload> {
        self.pending_upload.as_ref()
    }

    /// The persistable part of this block, without any pending upload
    pub fn block(&self) -> &ContentBlock {
        &self.block
    }

    /// Current payload in the shape editing views hand back
    pub fn draft_content(&self) -> DraftContent {
        DraftContent {
            content: self.block.content().clone(),
            pending_upload: self.pending_upload.clone(),
        }
    }

    /// Replace the payload, keeping id and type
    ///
    /// Returns `false` and leaves the block untouched when the new payload has a
    /// different type than the block.
    pub(crate) fn apply(&mut self, change: DraftContent) -> bool {
        if change.content.tag() != self.block.tag() {
            tracing::warn!(
                "Ignoring '{}' payload for '{}' block {}",
                change.content.tag(),
                self.block.tag(),
                self.block.id()
            );
            return false;
        }

        let is_image = matches!(change.content, BlockContent::Image(_));
        if !is_image && change.pending_upload.is_some() {
            tracing::warn!(
                "Dropping pending upload attached to non-image block {}",
                self.block.id()
            );
        }

        self.block.set_content(change.content);
        self.pending_upload = if is_image { change.pending_upload } else { None };
        true
    }

    /// Copy of this block under a fresh id, pending upload included
    pub(crate) fn duplicate(&self) -> Self {
        Self {
            block: self.block.duplicate(),
            pending_upload: self.pending_upload.clone(),
        }
    }

    /// Swap the pending upload for the URL it was stored under
    ///
    /// Blocks without a pending upload, and non-image blocks, are returned
    /// unchanged.
    pub fn resolve(self, url: impl Into<String>) -> ContentBlock {
        let DraftBlock {
            mut block,
            pending_upload,
        } = self;

        if pending_upload.is_none() {
            return block;
        }

        let resolved = match block.content() {
            BlockContent::Image(image) => Some(ImageContent {
                url: url.into(),
                ..image.clone()
            }),
            _ => None,
        };
        if let Some(image) = resolved {
            block.set_content(BlockContent::Image(image));
        }
        block
    }

    /// Drop any pending upload and return the persistable block
    pub fn into_block(self) -> ContentBlock {
        self.block
    }
}

impl From<ContentBlock> for DraftBlock {
    fn from(block: ContentBlock) -> Self {
        Self {
            block,
            pending_upload: None,
        }
    }
}
