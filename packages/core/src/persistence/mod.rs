//! Persistence Adapter
//!
//! - `codec` - project <-> record field mapping, `content_blocks` parsing
//! - `repository` - load, list and all-or-nothing save with concurrent uploads
//! - `session` - the `Loading → Ready → Saving → Ready` editing session

pub mod codec;
mod error;
pub mod repository;
pub mod session;

pub use codec::{decode_blocks, encode_blocks, CONTENT_BLOCKS_FIELD};
pub use error::PersistenceError;
pub use repository::{resolve_uploads, ProjectRepository};
pub use session::{EditorSession, SessionEvent, SessionState, SESSION_EVENT_CAPACITY};
