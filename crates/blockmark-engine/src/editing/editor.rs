use chrono::{DateTime, Utc};

use crate::models::{Block, BlockId, BlockKind, BlockType};
use crate::parsing::{blocks_to_markdown, parse_markdown_to_blocks};

use super::EditOutcome;
use super::input::interpret_typed_text;

/// Shallow replacement of a block's content and/or kind.
///
/// Also used as the initial data of a new block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockUpdate {
    pub content: Option<String>,
    pub kind: Option<BlockKind>,
}

impl BlockUpdate {
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            kind: None,
        }
    }

    pub fn with_kind(kind: BlockKind) -> Self {
        Self {
            content: None,
            kind: Some(kind),
        }
    }

    /// Both kind and content
    pub fn replace(kind: BlockKind, content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            kind: Some(kind),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResetOptions {
    /// Focus the last block after loading instead of nothing
    pub focus_last: bool,
}

/// The authoritative in-memory document.
///
/// Owns the block list together with focus and save metadata. Every
/// operation is total: unknown ids and structural violations are reported
/// through [`EditOutcome`] and leave the list untouched. Every mutating call
/// marks the editor dirty, including the ones that changed nothing; only
/// [`reset_editor`](Self::reset_editor) and [`mark_as_saved`](Self::mark_as_saved)
/// clear it.
///
/// ```rust
/// use blockmark_engine::editing::{BlockEditor, Direction, EditOutcome};
///
/// let mut editor = BlockEditor::from_markdown("First\n\nSecond");
/// let first = editor.blocks()[0].id;
/// assert_eq!(editor.move_block(first, Direction::Up), EditOutcome::Refused);
/// assert!(editor.is_dirty());
/// ```
#[derive(Debug, Clone)]
pub struct BlockEditor {
    pub(crate) blocks: Vec<Block>,
    pub(crate) active_block_id: Option<BlockId>,
    pub(crate) is_dirty: bool,
    pub(crate) last_saved: Option<DateTime<Utc>>,
}

impl Default for BlockEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockEditor {
    /// A new document: one empty paragraph, clean, nothing focused
    pub fn new() -> Self {
        Self::with_blocks(vec![Block::empty_paragraph()])
    }

    pub fn from_markdown(markdown: &str) -> Self {
        Self::with_blocks(parse_markdown_to_blocks(markdown))
    }

    fn with_blocks(blocks: Vec<Block>) -> Self {
        Self {
            blocks,
            active_block_id: None,
            is_dirty: false,
            last_saved: None,
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.iter().find(|block| block.id == id)
    }

    pub fn active_block_id(&self) -> Option<BlockId> {
        self.active_block_id
    }

    pub fn active_block(&self) -> Option<&Block> {
        self.active_block_id.and_then(|id| self.block(id))
    }

    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    pub fn last_saved(&self) -> Option<DateTime<Utc>> {
        self.last_saved
    }

    pub(crate) fn index_of(&self, id: BlockId) -> Option<usize> {
        self.blocks.iter().position(|block| block.id == id)
    }

    /// Replace the content and/or kind of a block
    pub fn update_block(&mut self, id: BlockId, update: BlockUpdate) -> EditOutcome {
        self.is_dirty = true;
        let Some(block) = self.blocks.iter_mut().find(|block| block.id == id) else {
            log::debug!("update_block: no block {id}");
            return EditOutcome::NotFound;
        };

        if let Some(kind) = update.kind {
            block.kind = kind;
        }
        if let Some(content) = update.content {
            block.content = content;
        }
        clear_rule_content(block);
        EditOutcome::Applied
    }

    /// Store text the user just typed, applying the live-typing rules.
    ///
    /// Code blocks take the text verbatim.
    pub fn apply_typed_text(&mut self, id: BlockId, text: &str) -> EditOutcome {
        let is_code = self
            .block(id)
            .is_some_and(|block| block.block_type() == BlockType::Code);
        let update = if is_code {
            BlockUpdate::with_content(text)
        } else {
            interpret_typed_text(text)
        };
        self.update_block(id, update)
    }

    /// Insert a new block and focus it.
    ///
    /// Goes after `after_id`, or at the end when that is `None` or unknown.
    /// `initial.kind` is used only when it is of `block_type`; otherwise the
    /// type's default kind applies.
    pub fn add_block(
        &mut self,
        block_type: BlockType,
        after_id: Option<BlockId>,
        initial: BlockUpdate,
    ) -> BlockId {
        let kind = match initial.kind {
            Some(kind) if kind.block_type() == block_type => kind,
            Some(kind) => {
                log::debug!(
                    "add_block: ignoring initial {} kind for a {block_type} block",
                    kind.block_type()
                );
                BlockKind::default_for(block_type)
            }
            None => BlockKind::default_for(block_type),
        };
        let mut block = Block::new(kind, initial.content.unwrap_or_default());
        clear_rule_content(&mut block);
        let id = block.id;

        let index = after_id
            .and_then(|after| self.index_of(after))
            .map_or(self.blocks.len(), |index| index + 1);
        self.blocks.insert(index, block);
        self.active_block_id = Some(id);
        self.is_dirty = true;
        id
    }

    /// Remove a block, focusing the one before it. The last block is kept.
    pub fn remove_block(&mut self, id: BlockId) -> EditOutcome {
        self.is_dirty = true;
        let Some(index) = self.index_of(id) else {
            log::debug!("remove_block: no block {id}");
            return EditOutcome::NotFound;
        };
        if self.blocks.len() <= 1 {
            log::debug!("remove_block: refusing to remove the only block");
            return EditOutcome::Refused;
        }

        self.blocks.remove(index);
        self.active_block_id = self
            .blocks
            .get(index.saturating_sub(1))
            .map(|block| block.id);
        EditOutcome::Applied
    }

    /// Append a block's content to the previous block and remove it.
    ///
    /// The previous block keeps its kind. A horizontal rule holds no text, so
    /// merging into one removes the rule instead.
    pub fn merge_with_previous(&mut self, id: BlockId) -> EditOutcome {
        self.is_dirty = true;
        let Some(index) = self.index_of(id) else {
            log::debug!("merge_with_previous: no block {id}");
            return EditOutcome::NotFound;
        };
        if index == 0 {
            log::debug!("merge_with_previous: first block has nothing to merge into");
            return EditOutcome::Refused;
        }

        if self.blocks[index - 1].block_type() == BlockType::HorizontalRule {
            self.blocks.remove(index - 1);
            self.active_block_id = Some(id);
            return EditOutcome::Applied;
        }

        let removed = self.blocks.remove(index);
        let previous = &mut self.blocks[index - 1];
        previous.content.push_str(&removed.content);
        self.active_block_id = Some(previous.id);
        EditOutcome::Applied
    }

    /// Swap a block with its neighbour
    pub fn move_block(&mut self, id: BlockId, direction: Direction) -> EditOutcome {
        self.is_dirty = true;
        let Some(index) = self.index_of(id) else {
            log::debug!("move_block: no block {id}");
            return EditOutcome::NotFound;
        };

        let target = match direction {
            Direction::Up => index.checked_sub(1),
            Direction::Down => Some(index + 1).filter(|&next| next < self.blocks.len()),
        };
        match target {
            Some(target) => {
                self.blocks.swap(index, target);
                EditOutcome::Applied
            }
            None => EditOutcome::Refused,
        }
    }

    pub fn get_markdown(&self) -> String {
        blocks_to_markdown(&self.blocks)
    }

    /// Replace the whole document with freshly parsed markdown
    pub fn reset_editor(&mut self, markdown: &str, options: ResetOptions) {
        self.blocks = parse_markdown_to_blocks(markdown);
        self.active_block_id = if options.focus_last {
            self.blocks.last().map(|block| block.id)
        } else {
            None
        };
        self.is_dirty = false;
        self.last_saved = Some(Utc::now());
    }

    pub fn mark_as_saved(&mut self) {
        self.is_dirty = false;
        self.last_saved = Some(Utc::now());
    }

    /// Move focus. Does not touch the dirty flag.
    ///
    /// An id that is not in the document is ignored so the active id always
    /// refers to an existing block.
    pub fn set_active_block(&mut self, id: Option<BlockId>) -> EditOutcome {
        match id {
            Some(id) if self.index_of(id).is_none() => {
                log::debug!("set_active_block: no block {id}");
                EditOutcome::NotFound
            }
            _ => {
                self.active_block_id = id;
                EditOutcome::Applied
            }
        }
    }
}

fn clear_rule_content(block: &mut Block) {
    if block.block_type() == BlockType::HorizontalRule {
        block.content.clear();
    }
}
