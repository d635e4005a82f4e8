use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque, unique identifier of a block.
///
/// Generated when the block is created and never derived from content, so two
/// blocks with identical text still get distinct ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(Uuid);

impl BlockId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an id previously produced by `Display`
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Default for BlockId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The closed vocabulary of block types, without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockType {
    #[serde(rename = "paragraph")]
    Paragraph,
    #[serde(rename = "heading-1")]
    Heading1,
    #[serde(rename = "heading-2")]
    Heading2,
    #[serde(rename = "heading-3")]
    Heading3,
    #[serde(rename = "unordered-list-item")]
    UnorderedListItem,
    #[serde(rename = "ordered-list-item")]
    OrderedListItem,
    /// Generic list item that has not been classified as ordered or unordered
    #[serde(rename = "list-item")]
    ListItem,
    #[serde(rename = "blockquote")]
    Blockquote,
    #[serde(rename = "code")]
    Code,
    #[serde(rename = "hr")]
    HorizontalRule,
    #[serde(rename = "checkbox")]
    Checkbox,
    #[serde(rename = "image")]
    Image,
}

impl BlockType {
    /// Types that form a list run for serializer spacing purposes.
    ///
    /// The generic `ListItem` is not one of them; it serializes as plain text.
    pub fn is_list_type(self) -> bool {
        matches!(
            self,
            BlockType::UnorderedListItem | BlockType::OrderedListItem | BlockType::Checkbox
        )
    }

    /// Types that continue as the same type when Enter is pressed on them
    pub fn is_list_like(self) -> bool {
        self.is_list_type() || self == BlockType::ListItem
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BlockType::Paragraph => "paragraph",
            BlockType::Heading1 => "heading-1",
            BlockType::Heading2 => "heading-2",
            BlockType::Heading3 => "heading-3",
            BlockType::UnorderedListItem => "unordered-list-item",
            BlockType::OrderedListItem => "ordered-list-item",
            BlockType::ListItem => "list-item",
            BlockType::Blockquote => "blockquote",
            BlockType::Code => "code",
            BlockType::HorizontalRule => "hr",
            BlockType::Checkbox => "checkbox",
            BlockType::Image => "image",
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Three-state checkbox status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl CheckStatus {
    /// The bracketed marker written after the list bullet
    pub fn marker(self) -> &'static str {
        match self {
            CheckStatus::Todo => "[ ]",
            CheckStatus::InProgress => "[/]",
            CheckStatus::Done => "[x]",
        }
    }

    /// todo -> in_progress -> done -> todo
    pub fn next(self) -> Self {
        match self {
            CheckStatus::Todo => CheckStatus::InProgress,
            CheckStatus::InProgress => CheckStatus::Done,
            CheckStatus::Done => CheckStatus::Todo,
        }
    }
}

/// Block type together with the metadata that only that type may carry.
///
/// A checkbox always has a status, an image always has a source, and only a
/// code block has a language; no other combination can be represented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BlockKind {
    #[serde(rename = "paragraph")]
    Paragraph,
    #[serde(rename = "heading-1")]
    Heading1,
    #[serde(rename = "heading-2")]
    Heading2,
    #[serde(rename = "heading-3")]
    Heading3,
    #[serde(rename = "unordered-list-item")]
    UnorderedListItem,
    #[serde(rename = "ordered-list-item")]
    OrderedListItem,
    #[serde(rename = "list-item")]
    ListItem,
    #[serde(rename = "blockquote")]
    Blockquote,
    #[serde(rename = "code")]
    Code { language: Option<String> },
    #[serde(rename = "hr")]
    HorizontalRule,
    #[serde(rename = "checkbox")]
    Checkbox { status: CheckStatus },
    #[serde(rename = "image")]
    Image { src: String },
}

impl BlockKind {
    /// The kind a freshly created block of `block_type` starts with
    pub fn default_for(block_type: BlockType) -> Self {
        match block_type {
            BlockType::Paragraph => BlockKind::Paragraph,
            BlockType::Heading1 => BlockKind::Heading1,
            BlockType::Heading2 => BlockKind::Heading2,
            BlockType::Heading3 => BlockKind::Heading3,
            BlockType::UnorderedListItem => BlockKind::UnorderedListItem,
            BlockType::OrderedListItem => BlockKind::OrderedListItem,
            BlockType::ListItem => BlockKind::ListItem,
            BlockType::Blockquote => BlockKind::Blockquote,
            BlockType::Code => BlockKind::Code { language: None },
            BlockType::HorizontalRule => BlockKind::HorizontalRule,
            BlockType::Checkbox => BlockKind::Checkbox {
                status: CheckStatus::Todo,
            },
            BlockType::Image => BlockKind::Image { src: String::new() },
        }
    }

    pub fn block_type(&self) -> BlockType {
        match self {
            BlockKind::Paragraph => BlockType::Paragraph,
            BlockKind::Heading1 => BlockType::Heading1,
            BlockKind::Heading2 => BlockType::Heading2,
            BlockKind::Heading3 => BlockType::Heading3,
            BlockKind::UnorderedListItem => BlockType::UnorderedListItem,
            BlockKind::OrderedListItem => BlockType::OrderedListItem,
            BlockKind::ListItem => BlockType::ListItem,
            BlockKind::Blockquote => BlockType::Blockquote,
            BlockKind::Code { .. } => BlockType::Code,
            BlockKind::HorizontalRule => BlockType::HorizontalRule,
            BlockKind::Checkbox { .. } => BlockType::Checkbox,
            BlockKind::Image { .. } => BlockType::Image,
        }
    }

    /// Heading kind for levels 1-3, `None` for anything deeper
    pub fn heading(level: usize) -> Option<Self> {
        match level {
            1 => Some(BlockKind::Heading1),
            2 => Some(BlockKind::Heading2),
            3 => Some(BlockKind::Heading3),
            _ => None,
        }
    }

    pub fn heading_level(&self) -> Option<usize> {
        match self {
            BlockKind::Heading1 => Some(1),
            BlockKind::Heading2 => Some(2),
            BlockKind::Heading3 => Some(3),
            _ => None,
        }
    }
}

/// The atomic editable unit of a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    #[serde(flatten)]
    pub kind: BlockKind,
    pub content: String,
}

impl Block {
    pub fn new(kind: BlockKind, content: impl Into<String>) -> Self {
        Self {
            id: BlockId::new(),
            kind,
            content: content.into(),
        }
    }

    pub fn paragraph(content: impl Into<String>) -> Self {
        Self::new(BlockKind::Paragraph, content)
    }

    /// The single block of a brand new document
    pub fn empty_paragraph() -> Self {
        Self::paragraph(String::new())
    }

    pub fn block_type(&self) -> BlockType {
        self.kind.block_type()
    }

    /// Compare everything except the id
    pub fn same_shape(&self, other: &Block) -> bool {
        self.kind == other.kind && self.content == other.content
    }
}
