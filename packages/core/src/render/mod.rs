//! Block Renderer
//!
//! [`render`] dispatches on a block's type and returns the matching editing
//! view. Views read the block's current content and turn user edits into a
//! [`BlockChange`]: a complete, type-correct replacement payload addressed at
//! the block. Changes are fed back into the document unmodified through
//! [`apply_change`].
//!
//! Blocks of an unknown type get an [`UnknownBlockView`] placeholder; they are
//! never an error.
//!
//! # Examples
//!
//! ```rust
//! use folio_core::editor::DocumentState;
//! use folio_core::models::BlockKind;
//! use folio_core::render::{apply_change, render, BlockView};
//!
//! let mut doc = DocumentState::new();
//! doc.add(BlockKind::Title);
//!
//! let change = match render(&doc.blocks()[0]) {
//!     BlockView::Title(view) => view.set_text("About this project"),
//!     _ => unreachable!(),
//! };
//! assert!(apply_change(&mut doc, change));
//! ```

mod views;

pub use views::{
    EmbedView, ImageView, ParagraphView, TitleView, UnknownBlockView, VideoView,
    UNKNOWN_BLOCK_PLACEHOLDER,
};

use crate::editor::DocumentState;
use crate::models::{BlockContent, DraftBlock, DraftContent};
use std::fmt;

/// Replacement payload emitted by an editing view
#[derive(Debug, Clone, PartialEq)]
pub struct BlockChange {
    pub block_id: String,
    pub content: DraftContent,
}

/// Type-specific editing view of one block
#[derive(Debug, Clone)]
pub enum BlockView<'a> {
    Title(TitleView<'a>),
    Paragraph(ParagraphView<'a>),
    Image(ImageView<'a>),
    Video(VideoView<'a>),
    Embed(EmbedView<'a>),
    Unknown(UnknownBlockView<'a>),
}

impl BlockView<'_> {
    pub fn block_id(&self) -> &str {
        match self {
            BlockView::Title(v) => v.block_id(),
            BlockView::Paragraph(v) => v.block_id(),
            BlockView::Image(v) => v.block_id(),
            BlockView::Video(v) => v.block_id(),
            BlockView::Embed(v) => v.block_id(),
            BlockView::Unknown(v) => v.block_id(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, BlockView::Unknown(_))
    }
}

impl fmt::Display for BlockView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockView::Title(v) => fmt::Display::fmt(v, f),
            BlockView::Paragraph(v) => fmt::Display::fmt(v, f),
            BlockView::Image(v) => fmt::Display::fmt(v, f),
            BlockView::Video(v) => fmt::Display::fmt(v, f),
            BlockView::Embed(v) => fmt::Display::fmt(v, f),
            BlockView::Unknown(v) => fmt::Display::fmt(v, f),
        }
    }
}

/// Select the editing view for `block`
pub fn render(block: &DraftBlock) -> BlockView<'_> {
    let id = block.id();
    match block.content() {
        BlockContent::Title(content) => BlockView::Title(TitleView::new(id, content)),
        BlockContent::Paragraph(content) => {
            BlockView::Paragraph(ParagraphView::new(id, content))
        }
        BlockContent::Image(content) => {
            BlockView::Image(ImageView::new(id, content, block.pending_upload()))
        }
        BlockContent::Video(content) => BlockView::Video(VideoView::new(id, content)),
        BlockContent::Embed(content) => BlockView::Embed(EmbedView::new(id, content)),
        BlockContent::Opaque { tag, .. } => BlockView::Unknown(UnknownBlockView::new(id, tag)),
    }
}

/// Views for every block of a document, in order
pub fn render_all(document: &DocumentState) -> Vec<BlockView<'_>> {
    document.blocks().iter().map(render).collect()
}

/// Forward a view's change into the document
pub fn apply_change(document: &mut DocumentState, change: BlockChange) -> bool {
    document.update(&change.block_id, change.content)
}
