//! Block Editor
//!
//! - `DocumentState` - owner of one project's block sequence (add, update,
//!   delete, duplicate, reorder)
//! - `reorder` - pure drag-and-drop move computation

pub mod document;
pub mod reorder;

pub use document::{ConfirmDelete, DocumentState, DELETE_CONFIRMATION_PROMPT};
pub use reorder::{move_block, plan_move, position_of, Identified};
