//! Document State Manager
//!
//! [`DocumentState`] owns the ordered block sequence of one editing session.
//! Every mutation goes through its methods; each one completes synchronously
//! and leaves the sequence in a consistent state.
//!
//! Operations addressed at an id that is not in the sequence are silent no-ops.
//! They happen when a UI event races a previous mutation and are not errors.

use crate::editor::reorder::{move_block, plan_move, position_of};
use crate::models::{BlockKind, ContentBlock, DraftBlock, DraftContent};
use std::collections::HashSet;

/// Prompt shown before a block is deleted
pub const DELETE_CONFIRMATION_PROMPT: &str = "Are you sure you want to delete this block?";

/// Confirmation step required before a block is deleted
///
/// Implemented for any `Fn(&DraftBlock) -> bool`, so a closure works:
///
/// ```rust
/// use folio_core::editor::DocumentState;
/// use folio_core::models::{BlockKind, DraftBlock};
///
/// let mut doc = DocumentState::new();
/// let id = doc.add(BlockKind::Embed).id().to_string();
///
/// assert!(!doc.delete(&id, &|_: &DraftBlock| false));
/// assert!(doc.delete(&id, &|_: &DraftBlock| true));
/// assert!(doc.is_empty());
/// ```
pub trait ConfirmDelete {
    fn confirm_delete(&self, block: &DraftBlock) -> bool;
}

impl<F> ConfirmDelete for F
where
    F: Fn(&DraftBlock) -> bool,
{
    fn confirm_delete(&self, block: &DraftBlock) -> bool {
        self(block)
    }
}

/// In-memory block sequence of one project
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentState {
    blocks: Vec<DraftBlock>,
}

impl DocumentState {
    /// Empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Document hydrated from persisted blocks
    ///
    /// Block ids must be unique; a later block reusing an id seen earlier is
    /// given a fresh one.
    pub fn from_blocks(blocks: impl IntoIterator<Item = ContentBlock>) -> Self {
        let mut seen = HashSet::new();
        let blocks = blocks
            .into_iter()
            .map(|block| {
                if seen.insert(block.id().to_string()) {
                    return DraftBlock::from(block);
                }
                let fresh = block.duplicate();
                tracing::warn!(
                    "Block id {} is used more than once, re-keying the later copy as {}",
                    block.id(),
                    fresh.id()
                );
                seen.insert(fresh.id().to_string());
                DraftBlock::from(fresh)
            })
            .collect();
        Self { blocks }
    }

    pub fn blocks(&self) -> &[DraftBlock] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&DraftBlock> {
        self.blocks.iter().find(|block| block.id() == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        position_of(&self.blocks, id)
    }

    /// Block ids in document order
    pub fn ids(&self) -> Vec<&str> {
        self.blocks.iter().map(|block| block.id()).collect()
    }

    /// Number of image blocks waiting for an upload on the next save
    pub fn pending_uploads(&self) -> usize {
        self.blocks
            .iter()
            .filter(|block| block.pending_upload().is_some())
            .count()
    }

    /// Append a new block of `kind` with default content
    pub fn add(&mut self, kind: BlockKind) -> &DraftBlock {
        let block = DraftBlock::new(kind);
        tracing::debug!("Adding {} block {}", kind, block.id());
        self.blocks.push(block);
        &self.blocks[self.blocks.len() - 1]
    }

    /// Replace the content of block `id`
    ///
    /// Returns `false` when no block has that id, or when the new content is of
    /// a different type than the block.
    pub fn update(&mut self, id: &str, content: impl Into<DraftContent>) -> bool {
        match self.blocks.iter_mut().find(|block| block.id() == id) {
            Some(block) => block.apply(content.into()),
            None => {
                tracing::debug!("Ignoring update for missing block {}", id);
                false
            }
        }
    }

    /// Remove block `id` once `confirm` agrees
    ///
    /// The confirmation is only asked for blocks that exist.
    pub fn delete<C>(&mut self, id: &str, confirm: &C) -> bool
    where
        C: ConfirmDelete + ?Sized,
    {
        let Some(index) = self.position(id) else {
            tracing::debug!("Ignoring delete for missing block {}", id);
            return false;
        };

        if !confirm.confirm_delete(&self.blocks[index]) {
            tracing::debug!("Delete of block {} was not confirmed", id);
            return false;
        }

        self.blocks.remove(index);
        true
    }

    /// Insert a copy of block `id` right after it, under a fresh id
    pub fn duplicate(&mut self, id: &str) -> Option<&DraftBlock> {
        let Some(index) = self.position(id) else {
            tracing::debug!("Ignoring duplicate for missing block {}", id);
            return None;
        };

        let copy = self.blocks[index].duplicate();
        self.blocks.insert(index + 1, copy);
        Some(&self.blocks[index + 1])
    }

    /// Drop block `source_id` onto block `target_id`
    ///
    /// Returns `false` when nothing moved.
    pub fn reorder(&mut self, source_id: &str, target_id: &str) -> bool {
        let Some((from, to)) = plan_move(&self.blocks, source_id, target_id) else {
            return false;
        };

        tracing::debug!("Moving block {} from {} to {}", source_id, from, to);
        self.blocks = move_block(std::mem::take(&mut self.blocks), source_id, target_id);
        true
    }
}
