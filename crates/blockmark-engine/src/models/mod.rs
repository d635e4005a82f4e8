pub mod block;
pub mod document_ref;

pub use block::{Block, BlockId, BlockKind, BlockType, CheckStatus};
pub use document_ref::DocumentRef;
