//! Conversion between markdown text and the flat block list.
//!
//! Both directions are pure functions with no I/O. The writer's output is the
//! persisted format and the reader accepts it back:
//!
//! ```rust
//! use blockmark_engine::parsing::{blocks_to_markdown, parse_markdown_to_blocks};
//!
//! let blocks = parse_markdown_to_blocks("# Plan\n\n- [ ] write\n- [/] review");
//! assert_eq!(blocks.len(), 3);
//! assert_eq!(blocks_to_markdown(&blocks), "# Plan\n\n- [ ] write\n- [/] review");
//! ```

mod reader;
mod writer;

pub use reader::parse_markdown_to_blocks;
pub use writer::blocks_to_markdown;
