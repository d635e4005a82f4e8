/*!
 * # Block document state machine
 *
 * [`BlockEditor`] is the single authoritative copy of an open document: a
 * flat list of typed blocks plus focus and save metadata.
 *
 * ## Rules every operation keeps
 *
 * - The list never drops below one block. Removing the only block or merging
 *   the first one is refused.
 * - The active id is either `None` or the id of a block in the list.
 * - Every mutating call sets the dirty flag, even when it turns out to be a
 *   no-op. Only a reset or an explicit save clears it.
 * - Nothing panics and nothing returns an error; the [`EditOutcome`] says
 *   what happened.
 *
 * ## Typing
 *
 * Text typed into a block goes through [`interpret_typed_text`] first, so
 * `"# "` turns a paragraph into a heading and `"->"` becomes an arrow.
 * [`BlockEditor::press_enter`] and [`BlockEditor::press_backspace_at_start`]
 * carry the keyboard contracts on top of the primitives.
 *
 * ```rust
 * use blockmark_engine::editing::BlockEditor;
 * use blockmark_engine::models::BlockType;
 *
 * let mut editor = BlockEditor::new();
 * let id = editor.blocks()[0].id;
 * editor.apply_typed_text(id, "- [ ] write docs");
 * editor.press_enter(id, None);
 *
 * assert_eq!(editor.blocks()[1].block_type(), BlockType::Checkbox);
 * assert_eq!(editor.get_markdown(), "- [ ] write docs\n- [ ]");
 * ```
 */

mod editor;
mod input;
mod keys;
mod outcome;
mod snapshot;

#[cfg(test)]
mod invariant_tests;

pub use editor::{BlockEditor, BlockUpdate, Direction, ResetOptions};
pub use input::{interpret_typed_text, replace_shortcodes};
pub use outcome::EditOutcome;
pub use snapshot::EditorState;
