//! Structural rules checked over arbitrary operation sequences.

use proptest::prelude::*;

use super::{BlockEditor, BlockUpdate, Direction, ResetOptions};
use crate::models::{BlockId, BlockType};

const TYPES: [BlockType; 12] = [
    BlockType::Paragraph,
    BlockType::Heading1,
    BlockType::Heading2,
    BlockType::Heading3,
    BlockType::UnorderedListItem,
    BlockType::OrderedListItem,
    BlockType::ListItem,
    BlockType::Blockquote,
    BlockType::Code,
    BlockType::HorizontalRule,
    BlockType::Checkbox,
    BlockType::Image,
];

/// An operation addressed by position so it can hit existing blocks;
/// positions past the end address an unknown id
#[derive(Debug, Clone)]
enum Op {
    Add(usize, Option<usize>),
    Remove(usize),
    Merge(usize),
    Move(usize, bool),
    Type(usize, String),
    Enter(usize, Option<usize>),
    Backspace(usize),
    Cycle(usize),
    Focus(Option<usize>),
    Save,
    Reset(String, bool),
}

impl Op {
    /// Whether the operation must leave the editor dirty
    fn is_mutation(&self) -> bool {
        !matches!(self, Op::Focus(_) | Op::Save | Op::Reset(..))
    }
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let position = 0usize..8;
    prop_oneof![
        (0..TYPES.len(), proptest::option::of(position.clone())).prop_map(|(t, at)| Op::Add(t, at)),
        position.clone().prop_map(Op::Remove),
        position.clone().prop_map(Op::Merge),
        (position.clone(), any::<bool>()).prop_map(|(at, up)| Op::Move(at, up)),
        (position.clone(), "(# |- |- \\[ \\] |1\\. |```|---)?[a-z ]{0,6}(->)?")
            .prop_map(|(at, text)| Op::Type(at, text)),
        (position.clone(), proptest::option::of(0usize..10)).prop_map(|(at, cursor)| Op::Enter(at, cursor)),
        position.clone().prop_map(Op::Backspace),
        position.clone().prop_map(Op::Cycle),
        proptest::option::of(position).prop_map(Op::Focus),
        Just(Op::Save),
        ("(# [a-z]{1,4}\n\n)?(- [a-z]{1,4}\n){0,3}", any::<bool>())
            .prop_map(|(markdown, focus_last)| Op::Reset(markdown, focus_last)),
    ]
}

fn id_at(editor: &BlockEditor, position: usize) -> BlockId {
    editor
        .blocks()
        .get(position)
        .map_or_else(BlockId::new, |block| block.id)
}

fn apply(editor: &mut BlockEditor, op: &Op) {
    match op {
        Op::Add(type_index, after) => {
            let after = after.map(|position| id_at(editor, position));
            editor.add_block(TYPES[*type_index], after, BlockUpdate::default());
        }
        Op::Remove(at) => {
            editor.remove_block(id_at(editor, *at));
        }
        Op::Merge(at) => {
            editor.merge_with_previous(id_at(editor, *at));
        }
        Op::Move(at, up) => {
            let direction = if *up { Direction::Up } else { Direction::Down };
            editor.move_block(id_at(editor, *at), direction);
        }
        Op::Type(at, text) => {
            editor.apply_typed_text(id_at(editor, *at), text);
        }
        Op::Enter(at, cursor) => {
            editor.press_enter(id_at(editor, *at), *cursor);
        }
        Op::Backspace(at) => {
            editor.press_backspace_at_start(id_at(editor, *at));
        }
        Op::Cycle(at) => {
            editor.cycle_checkbox(id_at(editor, *at));
        }
        Op::Focus(at) => {
            let id = at.map(|position| id_at(editor, position));
            editor.set_active_block(id);
        }
        Op::Save => editor.mark_as_saved(),
        Op::Reset(markdown, focus_last) => editor.reset_editor(
            markdown,
            ResetOptions {
                focus_last: *focus_last,
            },
        ),
    }
}

fn assert_invariants(editor: &BlockEditor) -> Result<(), TestCaseError> {
    prop_assert!(!editor.blocks().is_empty(), "block list became empty");

    if let Some(active) = editor.active_block_id() {
        prop_assert!(
            editor.block(active).is_some(),
            "active id {active} is not in the document"
        );
    }

    let mut ids: Vec<_> = editor.blocks().iter().map(|block| block.id).collect();
    let count = ids.len();
    ids.sort_by_key(|id| id.to_string());
    ids.dedup();
    prop_assert_eq!(ids.len(), count, "duplicate block ids");

    for block in editor.blocks() {
        if block.block_type() == BlockType::HorizontalRule {
            prop_assert!(block.content.is_empty(), "rule with content");
        }
    }
    Ok(())
}

proptest! {
    #[test]
    fn prop_invariants_hold_after_every_operation(
        ops in prop::collection::vec(op_strategy(), 1..40)
    ) {
        let mut editor = BlockEditor::new();
        for op in &ops {
            let was_dirty = editor.is_dirty();
            apply(&mut editor, op);
            assert_invariants(&editor)?;

            match op {
                Op::Save | Op::Reset(..) => prop_assert!(!editor.is_dirty()),
                Op::Focus(_) => prop_assert_eq!(editor.is_dirty(), was_dirty),
                _ => {}
            }
            if op.is_mutation() {
                prop_assert!(editor.is_dirty(), "{:?} left the editor clean", op);
            }
        }
    }

    #[test]
    fn prop_removing_everything_keeps_one_block(
        markdown in "([a-z]{1,5}\n\n){1,6}",
        merge_first in any::<bool>()
    ) {
        let mut editor = BlockEditor::from_markdown(&markdown);
        for _ in 0..10 {
            let last = editor.blocks().len() - 1;
            let id = editor.blocks()[last].id;
            if merge_first {
                editor.merge_with_previous(id);
            } else {
                editor.remove_block(id);
            }
        }
        prop_assert_eq!(editor.blocks().len(), 1);
    }
}
