//! Markdown text to a flat block list.
//!
//! The reader walks pulldown-cmark's event stream together with source offsets.
//! Inline content is never re-rendered: a block's content is the raw source
//! span of its inline events, so emphasis, links and escapes survive a
//! round-trip through the writer unchanged.

use std::ops::Range;

use pulldown_cmark::{CodeBlockKind, Event, LinkType, Options, Parser, Tag, TagEnd};

use crate::models::{Block, BlockKind, CheckStatus};

/// Parse markdown into blocks in reading order.
///
/// Never fails: constructs the reader does not model are kept as paragraphs
/// holding their raw source, and so is top-level source that produces no
/// events at all (link reference definitions). The result always holds at
/// least one block.
pub fn parse_markdown_to_blocks(markdown: &str) -> Vec<Block> {
    let mut processor = BlockProcessor::new(markdown);

    for (event, range) in Parser::new_ext(markdown, parser_options()).into_offset_iter() {
        processor.process_event(event, range);
    }

    processor.finalize()
}

fn parser_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options
}

/// Recognise a checkbox marker at the start of list item text.
///
/// Covers the in-progress markers `[.]`, `[/]` and `[-]` that are not part of
/// GFM task lists, plus plain task markers the tokenizer left as text (for
/// instance an item holding nothing but `[ ]`).
fn split_checkbox_marker(text: &str) -> Option<(CheckStatus, &str)> {
    const MARKERS: [(&str, CheckStatus); 6] = [
        ("[.]", CheckStatus::InProgress),
        ("[/]", CheckStatus::InProgress),
        ("[-]", CheckStatus::InProgress),
        ("[ ]", CheckStatus::Todo),
        ("[x]", CheckStatus::Done),
        ("[X]", CheckStatus::Done),
    ];

    MARKERS.iter().find_map(|(marker, status)| {
        let rest = text.strip_prefix(marker)?;
        if rest.is_empty() {
            Some((*status, rest))
        } else {
            rest.strip_prefix(' ').map(|rest| (*status, rest))
        }
    })
}

/// What the inline run being collected will turn into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LeafKind {
    Paragraph,
    Heading(usize),
    /// The first text of a list item (tight item text or its first paragraph)
    ItemText,
}

/// Source extent of the inline content of one leaf block
#[derive(Debug)]
struct InlineRun {
    kind: LeafKind,
    /// Range of the element that opened this run
    element: Range<usize>,
    span: Option<Range<usize>>,
    /// Nesting of inline tags (emphasis, links, images)
    depth: usize,
    /// Inline tokens directly at depth 0
    top_level_tokens: usize,
    image: Option<ImageCandidate>,
}

#[derive(Debug)]
struct ImageCandidate {
    src: String,
    alt: Option<Range<usize>>,
    /// `![alt](src)` with no title, the only form an image block writes back
    plain: bool,
}

impl InlineRun {
    fn new(kind: LeafKind, element: Range<usize>) -> Self {
        Self {
            kind,
            element,
            span: None,
            depth: 0,
            top_level_tokens: 0,
            image: None,
        }
    }

    fn extend(&mut self, range: &Range<usize>) {
        self.span = Some(match self.span.take() {
            Some(span) => span.start.min(range.start)..span.end.max(range.end),
            None => range.clone(),
        });
    }

    /// Record a leaf inline event (text, code, breaks)
    fn push_token(&mut self, range: &Range<usize>) {
        if self.depth == 0 {
            self.top_level_tokens += 1;
        } else if let Some(image) = self.image.as_mut() {
            extend_range(&mut image.alt, range);
        }
        self.extend(range);
    }

    fn open_tag(&mut self, tag: &Tag, range: &Range<usize>) {
        if self.depth == 0 {
            self.top_level_tokens += 1;
            if let Tag::Image {
                link_type,
                dest_url,
                title,
                ..
            } = tag
            {
                self.image = Some(ImageCandidate {
                    src: dest_url.to_string(),
                    alt: None,
                    plain: *link_type == LinkType::Inline && title.is_empty(),
                });
            }
        } else if let Some(image) = self.image.as_mut() {
            extend_range(&mut image.alt, range);
        }
        self.depth += 1;
        self.extend(range);
    }

    fn close_tag(&mut self, range: &Range<usize>) {
        self.depth = self.depth.saturating_sub(1);
        self.extend(range);
    }

    /// The image, if it is the only inline token of this run and has no
    /// title or reference label that an image block would lose
    fn sole_image(&self) -> Option<&ImageCandidate> {
        if self.top_level_tokens == 1 {
            self.image.as_ref().filter(|image| image.plain)
        } else {
            None
        }
    }
}

fn extend_range(target: &mut Option<Range<usize>>, range: &Range<usize>) {
    *target = Some(match target.take() {
        Some(current) => current.start.min(range.start)..current.end.max(range.end),
        None => range.clone(),
    });
}

/// A container whose inner events are not interpreted
#[derive(Debug)]
struct OpaqueContainer {
    kind: OpaqueKind,
    range: Range<usize>,
    depth: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpaqueKind {
    Blockquote,
    /// Anything the reader has no block type for
    Raw,
}

#[derive(Debug)]
struct ItemFrame {
    ordered: bool,
    status: Option<CheckStatus>,
    emitted: bool,
}

#[derive(Debug)]
struct CodeCapture {
    language: Option<String>,
    text: String,
}

/// Turns pulldown-cmark events into blocks.
///
/// # Event flow for lists
///
/// ```markdown
/// - [x] done
///   - child
/// ```
///
/// produces `Start(List)`, `Start(Item)`, `TaskListMarker(true)`, `Text("done")`,
/// `Start(List)`, `Start(Item)`, `Text("child")`, `End(Item)`, `End(List)`,
/// `End(Item)`, `End(List)`. Nested lists appear inside their parent item, after
/// the parent's text, so the parent block is emitted as soon as its text run is
/// interrupted. Nesting itself is flattened: every item becomes one block.
struct BlockProcessor<'a> {
    source: &'a str,
    blocks: Vec<Block>,
    run: Option<InlineRun>,
    /// One entry per open list, `true` when ordered
    lists: Vec<bool>,
    items: Vec<ItemFrame>,
    code: Option<CodeCapture>,
    opaque: Option<OpaqueContainer>,
    /// Start/End nesting over all events; 0 between top-level blocks
    depth: usize,
    /// End of the source covered by events so far
    consumed: usize,
}

impl<'a> BlockProcessor<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            blocks: Vec::new(),
            run: None,
            lists: Vec::new(),
            items: Vec::new(),
            code: None,
            opaque: None,
            depth: 0,
            consumed: 0,
        }
    }

    fn process_event(&mut self, event: Event, range: Range<usize>) {
        if self.depth == 0 {
            self.keep_skipped_source(range.start);
        }
        match &event {
            Event::Start(_) => self.depth += 1,
            Event::End(_) => self.depth = self.depth.saturating_sub(1),
            _ => {}
        }
        // A list can end after reference definitions that follow its last
        // item; its items end where their content does.
        if !matches!(event, Event::Start(Tag::List(_)) | Event::End(TagEnd::List(_))) {
            self.consumed = self.consumed.max(range.end);
        }

        self.handle_event(event, range);
    }

    /// Keep source between the last top-level block and `until` that the
    /// parser produced no events for, one paragraph per blank-line separated
    /// chunk
    fn keep_skipped_source(&mut self, until: usize) {
        let skipped = self.slice(&(self.consumed..until));
        if skipped.trim().is_empty() {
            return;
        }
        self.flush_leaf();
        log::debug!("keeping {} bytes of eventless markdown as text", skipped.len());

        let mut chunk: Vec<&str> = Vec::new();
        for line in skipped.lines().chain(std::iter::once("")) {
            if !line.trim().is_empty() {
                chunk.push(line);
            } else if !chunk.is_empty() {
                self.blocks.push(Block::paragraph(chunk.join("\n").trim()));
                chunk.clear();
            }
        }
        self.consumed = until;
    }

    fn handle_event(&mut self, event: Event, range: Range<usize>) {
        if self.opaque.is_some() {
            self.process_opaque_event(&event);
            return;
        }

        if let Some(code) = self.code.as_mut() {
            match event {
                Event::Text(text) => code.text.push_str(&text),
                Event::End(TagEnd::CodeBlock) => self.finish_code_block(),
                _ => {}
            }
            return;
        }

        match event {
            Event::Start(Tag::Paragraph) => {
                let continues_item = self
                    .run
                    .as_ref()
                    .is_some_and(|run| run.kind == LeafKind::ItemText && run.span.is_none());
                if !continues_item {
                    self.flush_leaf();
                    self.run = Some(InlineRun::new(LeafKind::Paragraph, range));
                }
            }
            Event::End(TagEnd::Paragraph) => self.flush_leaf(),
            Event::Start(Tag::Heading { level, .. }) => {
                self.flush_leaf();
                self.run = Some(InlineRun::new(LeafKind::Heading(level as usize), range));
            }
            Event::End(TagEnd::Heading(_)) => self.flush_leaf(),
            Event::Start(Tag::List(first_number)) => {
                self.flush_leaf();
                self.lists.push(first_number.is_some());
            }
            Event::End(TagEnd::List(_)) => {
                self.flush_leaf();
                self.lists.pop();
            }
            Event::Start(Tag::Item) => {
                self.flush_leaf();
                self.items.push(ItemFrame {
                    ordered: self.lists.last().copied().unwrap_or(false),
                    status: None,
                    emitted: false,
                });
                self.run = Some(InlineRun::new(LeafKind::ItemText, range));
            }
            Event::End(TagEnd::Item) => {
                self.flush_leaf();
                self.items.pop();
            }
            Event::TaskListMarker(checked) => {
                if let Some(item) = self.items.last_mut() {
                    item.status = Some(if checked {
                        CheckStatus::Done
                    } else {
                        CheckStatus::Todo
                    });
                }
            }
            Event::Start(Tag::CodeBlock(kind)) => {
                self.flush_leaf();
                let language = match kind {
                    CodeBlockKind::Fenced(info) => {
                        let info = info.trim();
                        (!info.is_empty()).then(|| info.to_string())
                    }
                    CodeBlockKind::Indented => None,
                };
                self.code = Some(CodeCapture {
                    language,
                    text: String::new(),
                });
            }
            Event::Start(Tag::BlockQuote(_)) => {
                self.flush_leaf();
                self.opaque = Some(OpaqueContainer {
                    kind: OpaqueKind::Blockquote,
                    range,
                    depth: 1,
                });
            }
            Event::Rule => {
                self.flush_leaf();
                self.blocks
                    .push(Block::new(BlockKind::HorizontalRule, String::new()));
            }
            Event::Start(tag) if is_inline_tag(&tag) => {
                self.inline_run(&range).open_tag(&tag, &range);
            }
            Event::End(tag_end) if is_inline_tag_end(&tag_end) => {
                self.inline_run(&range).close_tag(&range);
            }
            Event::Start(_) => {
                // HTML blocks and containers without a block type of their own
                self.flush_leaf();
                self.opaque = Some(OpaqueContainer {
                    kind: OpaqueKind::Raw,
                    range,
                    depth: 1,
                });
            }
            Event::Text(_)
            | Event::Code(_)
            | Event::InlineHtml(_)
            | Event::InlineMath(_)
            | Event::FootnoteReference(_)
            | Event::SoftBreak
            | Event::HardBreak => {
                self.inline_run(&range).push_token(&range);
            }
            _ => {}
        }
    }

    fn process_opaque_event(&mut self, event: &Event) {
        let Some(opaque) = self.opaque.as_mut() else {
            return;
        };
        match event {
            Event::Start(_) => opaque.depth += 1,
            Event::End(_) => opaque.depth -= 1,
            _ => {}
        }
        if opaque.depth > 0 {
            return;
        }

        if let Some(opaque) = self.opaque.take() {
            let raw = self.slice(&opaque.range);
            match opaque.kind {
                OpaqueKind::Blockquote => {
                    let content = strip_quote_markers(raw);
                    self.blocks.push(Block::new(BlockKind::Blockquote, content));
                }
                OpaqueKind::Raw => {
                    let raw = raw.trim();
                    if !raw.is_empty() {
                        log::debug!("keeping {} bytes of unmodelled markdown as text", raw.len());
                        self.blocks.push(Block::paragraph(raw));
                    }
                }
            }
        }
    }

    /// The run inline events belong to, opening a paragraph if none is open
    fn inline_run(&mut self, range: &Range<usize>) -> &mut InlineRun {
        self.run
            .get_or_insert_with(|| InlineRun::new(LeafKind::Paragraph, range.clone()))
    }

    fn finish_code_block(&mut self) {
        if let Some(code) = self.code.take() {
            let mut text = code.text;
            if text.ends_with('\n') {
                text.pop();
            }
            self.blocks.push(Block::new(
                BlockKind::Code {
                    language: code.language,
                },
                text,
            ));
        }
    }

    /// Emit the block for the current inline run, if any
    fn flush_leaf(&mut self) {
        let Some(run) = self.run.take() else {
            return;
        };
        let text = run
            .span
            .as_ref()
            .map(|span| self.slice(span).trim().to_string())
            .unwrap_or_default();

        match run.kind {
            LeafKind::Paragraph => {
                if let Some(image) = run.sole_image() {
                    let alt = image
                        .alt
                        .as_ref()
                        .map(|alt| self.slice(alt).to_string())
                        .unwrap_or_default();
                    self.blocks.push(Block::new(
                        BlockKind::Image {
                            src: image.src.clone(),
                        },
                        alt,
                    ));
                } else if !text.is_empty() {
                    self.blocks.push(Block::paragraph(text));
                }
            }
            LeafKind::Heading(level) => match BlockKind::heading(level) {
                Some(kind) => self.blocks.push(Block::new(kind, text)),
                None => {
                    let raw = self.slice(&run.element).trim().to_string();
                    self.blocks.push(Block::paragraph(raw));
                }
            },
            LeafKind::ItemText => match self.items.last_mut() {
                Some(item) if !item.emitted => {
                    item.emitted = true;
                    let block = list_item_block(item.ordered, item.status, &text);
                    self.blocks.push(block);
                }
                _ if !text.is_empty() => self.blocks.push(Block::paragraph(text)),
                _ => {}
            },
        }
    }

    fn finalize(mut self) -> Vec<Block> {
        self.flush_leaf();
        self.finish_code_block();
        self.keep_skipped_source(self.source.len());
        if self.blocks.is_empty() {
            self.blocks.push(Block::empty_paragraph());
        }
        self.blocks
    }

    fn slice(&self, range: &Range<usize>) -> &'a str {
        self.source.get(range.clone()).unwrap_or_default()
    }
}

fn list_item_block(ordered: bool, status: Option<CheckStatus>, text: &str) -> Block {
    if let Some(status) = status {
        return Block::new(BlockKind::Checkbox { status }, text);
    }
    if let Some((status, rest)) = split_checkbox_marker(text) {
        return Block::new(BlockKind::Checkbox { status }, rest);
    }
    let kind = if ordered {
        BlockKind::OrderedListItem
    } else {
        BlockKind::UnorderedListItem
    };
    Block::new(kind, text)
}

fn is_inline_tag(tag: &Tag) -> bool {
    matches!(
        tag,
        Tag::Emphasis | Tag::Strong | Tag::Strikethrough | Tag::Link { .. } | Tag::Image { .. }
    )
}

fn is_inline_tag_end(tag_end: &TagEnd) -> bool {
    matches!(
        tag_end,
        TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link | TagEnd::Image
    )
}

/// Remove one level of `>` markers from every line of a blockquote's source
fn strip_quote_markers(raw: &str) -> String {
    raw.lines()
        .map(|line| match line.trim_start().strip_prefix('>') {
            Some(rest) => rest.strip_prefix(' ').unwrap_or(rest),
            None => line,
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
