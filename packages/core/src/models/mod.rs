//! Data Models
//!
//! This module contains the data structures shared by the editor and the
//! persistence layer:
//!
//! - `ContentBlock` / `BlockContent` - tagged content blocks and their payloads
//! - `DraftBlock` - a block as held by the editor, with an optional pending upload
//! - `ProjectDocument` / `ProjectFields` - a project and its form fields

mod block;
mod draft;
mod project;

pub use block::{
    new_block_id, BlockContent, BlockKind, ContentBlock, EmbedContent, HeadingLevel,
    ImageContent, ParagraphContent, TitleContent, VideoContent, VideoProvider,
    DEFAULT_PARAGRAPH_HTML, MISSING_TAG_LABEL,
};
pub use draft::{DraftBlock, DraftContent, PendingUpload};
pub use project::{ProjectDocument, ProjectFields, ProjectStatus};

use thiserror::Error;

/// Errors raised when parsing model enums from strings
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Unknown block type: {0}")]
    UnknownBlockKind(String),

    #[error("Unknown heading level: {0}")]
    UnknownHeadingLevel(String),

    #[error("Unknown video provider: {0}")]
    UnknownVideoProvider(String),

    #[error("Unknown project status: {0}")]
    UnknownStatus(String),
}
