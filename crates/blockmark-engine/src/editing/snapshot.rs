use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Block, BlockId};

use super::BlockEditor;

/// Owned, read-only copy of the editor state for rendering or inspection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorState {
    pub blocks: Vec<Block>,
    pub active_block_id: Option<BlockId>,
    pub is_dirty: bool,
    pub last_saved: Option<DateTime<Utc>>,
}

impl EditorState {
    pub fn active_block(&self) -> Option<&Block> {
        let id = self.active_block_id?;
        self.blocks.iter().find(|block| block.id == id)
    }
}

impl BlockEditor {
    pub fn snapshot(&self) -> EditorState {
        EditorState {
            blocks: self.blocks.clone(),
            active_block_id: self.active_block_id,
            is_dirty: self.is_dirty,
            last_saved: self.last_saved,
        }
    }
}
