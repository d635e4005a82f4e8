//! Enter and Backspace contracts built on the editor primitives.

use crate::models::{Block, BlockId, BlockKind, BlockType, CheckStatus};

use super::{BlockEditor, EditOutcome};

impl BlockEditor {
    /// Split a block at a byte offset, moving the tail into a new block.
    ///
    /// The offset is clamped to the content and floored to a char boundary.
    /// The new block continues list-like types (a checkbox restarts as todo)
    /// and is a paragraph otherwise. Returns the new block's id, which is
    /// also focused.
    pub fn split_block(&mut self, id: BlockId, offset: usize) -> Option<BlockId> {
        self.is_dirty = true;
        let Some(index) = self.index_of(id) else {
            log::debug!("split_block: no block {id}");
            return None;
        };

        let block = &mut self.blocks[index];
        let at = floor_char_boundary(&block.content, offset);
        let tail = block.content.split_off(at);
        let new_block = Block::new(continuation_kind(&block.kind), tail);
        let new_id = new_block.id;

        self.blocks.insert(index + 1, new_block);
        self.active_block_id = Some(new_id);
        Some(new_id)
    }

    /// Enter pressed with the caret at `cursor` (end of content when `None`).
    ///
    /// An empty list-like block is demoted to a paragraph in place, which is
    /// how a list is exited. Code blocks treat Enter as content and are left
    /// alone.
    pub fn press_enter(&mut self, id: BlockId, cursor: Option<usize>) -> EditOutcome {
        self.is_dirty = true;
        let Some(index) = self.index_of(id) else {
            log::debug!("press_enter: no block {id}");
            return EditOutcome::NotFound;
        };

        let block = &mut self.blocks[index];
        let block_type = block.block_type();
        if block_type == BlockType::Code {
            return EditOutcome::Refused;
        }
        if block_type.is_list_like() && block.content.is_empty() {
            block.kind = BlockKind::Paragraph;
            self.active_block_id = Some(id);
            return EditOutcome::Applied;
        }

        let offset = cursor.unwrap_or(block.content.len());
        match self.split_block(id, offset) {
            Some(_) => EditOutcome::Applied,
            None => EditOutcome::NotFound,
        }
    }

    /// Backspace pressed with the caret at the start of a block.
    ///
    /// Images are deleted outright; everything else merges into the
    /// previous block.
    pub fn press_backspace_at_start(&mut self, id: BlockId) -> EditOutcome {
        let is_image = self
            .block(id)
            .is_some_and(|block| block.block_type() == BlockType::Image);
        if is_image {
            self.remove_block(id)
        } else {
            self.merge_with_previous(id)
        }
    }

    /// Advance a checkbox: todo, in progress, done, then todo again
    pub fn cycle_checkbox(&mut self, id: BlockId) -> EditOutcome {
        self.is_dirty = true;
        let Some(block) = self.blocks.iter_mut().find(|block| block.id == id) else {
            log::debug!("cycle_checkbox: no block {id}");
            return EditOutcome::NotFound;
        };
        match &mut block.kind {
            BlockKind::Checkbox { status } => {
                *status = status.next();
                EditOutcome::Applied
            }
            _ => EditOutcome::Refused,
        }
    }
}

/// Kind of the block created by splitting a block of `kind`
fn continuation_kind(kind: &BlockKind) -> BlockKind {
    match kind {
        BlockKind::Checkbox { .. } => BlockKind::Checkbox {
            status: CheckStatus::Todo,
        },
        BlockKind::UnorderedListItem | BlockKind::OrderedListItem | BlockKind::ListItem => {
            kind.clone()
        }
        _ => BlockKind::Paragraph,
    }
}

fn floor_char_boundary(text: &str, offset: usize) -> usize {
    let mut at = offset.min(text.len());
    while !text.is_char_boundary(at) {
        at -= 1;
    }
    at
}
