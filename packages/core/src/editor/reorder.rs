//! Drag-and-drop reordering as a pure function
//!
//! The gesture layer (pointer tracking, drop-target detection) only has to
//! report which block was dragged and which block it was dropped onto. The move
//! itself is a single-element move: the dragged block is taken out of its slot
//! and reinserted at the drop target's index, shifting everything in between by
//! one. It is not a swap.

use crate::models::{ContentBlock, DraftBlock};

/// Anything that carries a block id
pub trait Identified {
    fn id(&self) -> &str;
}

impl Identified for ContentBlock {
    fn id(&self) -> &str {
        ContentBlock::id(self)
    }
}

impl Identified for DraftBlock {
    fn id(&self) -> &str {
        DraftBlock::id(self)
    }
}

/// Index of the block with the given id
pub fn position_of<T: Identified>(blocks: &[T], id: &str) -> Option<usize> {
    blocks.iter().position(|block| block.id() == id)
}

/// Source and destination index for dropping `source_id` onto `target_id`
///
/// `None` when the ids are equal or either one is missing.
pub fn plan_move<T: Identified>(
    blocks: &[T],
    source_id: &str,
    target_id: &str,
) -> Option<(usize, usize)> {
    if source_id == target_id {
        return None;
    }
    let from = position_of(blocks, source_id)?;
    let to = position_of(blocks, target_id)?;
    Some((from, to))
}

/// Move the block `source_id` to the position currently held by `target_id`
///
/// Returns the sequence unchanged when the move is a no-op.
///
/// # Examples
///
/// ```rust
/// use folio_core::editor::move_block;
/// use folio_core::models::{BlockKind, ContentBlock};
///
/// let a = ContentBlock::new(BlockKind::Title);
/// let b = ContentBlock::new(BlockKind::Image);
/// let c = ContentBlock::new(BlockKind::Video);
/// let ids = |blocks: &[ContentBlock]| blocks.iter().map(|b| b.id().to_string()).collect::<Vec<_>>();
///
/// let moved = move_block(vec![a.clone(), b.clone(), c.clone()], c.id(), a.id());
/// assert_eq!(ids(&moved), ids(&[c, a, b]));
/// ```
pub fn move_block<T: Identified>(mut blocks: Vec<T>, source_id: &str, target_id: &str) -> Vec<T> {
    if let Some((from, to)) = plan_move(&blocks, source_id, target_id) {
        let moved = blocks.remove(from);
        blocks.insert(to, moved);
    }
    blocks
}
