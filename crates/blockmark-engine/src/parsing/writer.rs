//! Block list to canonical markdown text.
//!
//! This is the persisted format: it must stay stable so existing documents
//! keep loading the same way.

use crate::models::{Block, BlockKind, BlockType};

/// Serialize blocks in list order.
///
/// List items are separated by single newlines, every other block is followed
/// by a blank line. A list run gets a blank line after it unless the next block
/// is an image, and an image directly after a list item gets one before it, so
/// the separation is never doubled.
pub fn blocks_to_markdown(blocks: &[Block]) -> String {
    let mut out = String::new();

    for (index, block) in blocks.iter().enumerate() {
        let block_type = block.block_type();
        let previous = index.checked_sub(1).and_then(|i| blocks.get(i));
        let next = blocks.get(index + 1);

        if block_type == BlockType::Image
            && previous.is_some_and(|previous| previous.block_type().is_list_type())
        {
            out.push('\n');
        }

        write_block(&mut out, block);

        if block_type.is_list_type()
            && next.is_some_and(|next| {
                let next_type = next.block_type();
                !next_type.is_list_type() && next_type != BlockType::Image
            })
        {
            out.push('\n');
        }
    }

    out.trim().to_string()
}

fn write_block(out: &mut String, block: &Block) {
    let content = block.content.as_str();
    match &block.kind {
        BlockKind::Heading1 | BlockKind::Heading2 | BlockKind::Heading3 => {
            let level = block.kind.heading_level().unwrap_or(1);
            out.push_str(&"#".repeat(level));
            out.push(' ');
            out.push_str(content);
            out.push_str("\n\n");
        }
        BlockKind::UnorderedListItem => {
            out.push_str("- ");
            out.push_str(content);
            out.push('\n');
        }
        BlockKind::OrderedListItem => {
            // Always literal "1.": numbering is left to whatever renders the file
            out.push_str("1. ");
            out.push_str(content);
            out.push('\n');
        }
        BlockKind::Checkbox { status } => {
            out.push_str("- ");
            out.push_str(status.marker());
            out.push(' ');
            out.push_str(content);
            out.push('\n');
        }
        BlockKind::Blockquote => {
            for (index, line) in content.split('\n').enumerate() {
                if index == 0 {
                    out.push_str("> ");
                    out.push_str(line);
                } else if line.is_empty() {
                    out.push_str("\n>");
                } else {
                    out.push_str("\n> ");
                    out.push_str(line);
                }
            }
            out.push_str("\n\n");
        }
        BlockKind::Code { language } => {
            let fence = code_fence_for(content);
            out.push_str(&fence);
            out.push_str(language.as_deref().unwrap_or(""));
            out.push('\n');
            out.push_str(content);
            out.push('\n');
            out.push_str(&fence);
            out.push_str("\n\n");
        }
        BlockKind::Image { src } => {
            out.push_str("![");
            out.push_str(content);
            out.push_str("](");
            push_link_destination(out, src);
            out.push_str(")\n\n");
        }
        BlockKind::HorizontalRule => out.push_str("---\n\n"),
        BlockKind::Paragraph | BlockKind::ListItem => {
            out.push_str(content);
            out.push_str("\n\n");
        }
    }
}

/// Write a link destination so it reads back as exactly `src`.
///
/// Sources with whitespace or angle brackets use the `<...>` form, anything
/// else is written bare with parentheses and backslashes escaped.
fn push_link_destination(out: &mut String, src: &str) {
    let bracketed = src.contains(|c: char| c.is_whitespace() || c == '<' || c == '>');
    if bracketed {
        out.push('<');
    }
    for c in src.chars() {
        let escape = match c {
            '\\' => true,
            '<' | '>' => bracketed,
            '(' | ')' => !bracketed,
            _ => false,
        };
        if escape {
            out.push('\\');
        }
        out.push(c);
    }
    if bracketed {
        out.push('>');
    }
}

/// Triple backticks, or one more than the longest backtick run in the code
fn code_fence_for(code: &str) -> String {
    let longest_run = code
        .split(|c: char| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    "`".repeat(longest_run.max(2) + 1)
}
