pub mod editing;
pub mod io;
pub mod models;
pub mod parsing;
pub mod session;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use editing::{BlockEditor, BlockUpdate, Direction, EditOutcome, EditorState, ResetOptions};
pub use io::{DocumentStore, FsStore, ResolvedAttachment, StoreError};
pub use models::{Block, BlockId, BlockKind, BlockType, CheckStatus, DocumentRef};
pub use parsing::{blocks_to_markdown, parse_markdown_to_blocks};
pub use session::{EditingSession, LoadTicket};
