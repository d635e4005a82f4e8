//! Live-typing rules: recognized prefixes promote a block to a structured type.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::{BlockKind, CheckStatus};

use super::BlockUpdate;

/// Typed shortcodes and the symbol each one becomes, applied in order
const SHORTCODES: [(&str, &str); 8] = [
    ("<->", "↔"),
    ("->", "→"),
    ("<-", "←"),
    ("=>", "⇒"),
    ("!=", "≠"),
    ("...", "…"),
    ("(c)", "©"),
    ("(tm)", "™"),
];

/// Prefixes that change the block type, first match wins
const PREFIXES: [(&str, PrefixKind); 9] = [
    ("# ", PrefixKind::Heading(1)),
    ("## ", PrefixKind::Heading(2)),
    ("### ", PrefixKind::Heading(3)),
    ("> ", PrefixKind::Blockquote),
    ("- [ ] ", PrefixKind::Checkbox(CheckStatus::Todo)),
    ("- [/] ", PrefixKind::Checkbox(CheckStatus::InProgress)),
    ("- [x] ", PrefixKind::Checkbox(CheckStatus::Done)),
    ("- ", PrefixKind::Unordered),
    ("* ", PrefixKind::Unordered),
];

#[derive(Debug, Clone, Copy)]
enum PrefixKind {
    Heading(usize),
    Blockquote,
    Checkbox(CheckStatus),
    Unordered,
}

impl PrefixKind {
    fn kind(self) -> BlockKind {
        match self {
            PrefixKind::Heading(level) => BlockKind::heading(level).unwrap_or(BlockKind::Heading1),
            PrefixKind::Blockquote => BlockKind::Blockquote,
            PrefixKind::Checkbox(status) => BlockKind::Checkbox { status },
            PrefixKind::Unordered => BlockKind::UnorderedListItem,
        }
    }
}

fn ordered_prefix() -> &'static Regex {
    static ORDERED_PREFIX: OnceLock<Regex> = OnceLock::new();
    ORDERED_PREFIX.get_or_init(|| Regex::new(r"^[0-9]+\. ").expect("Invalid ordered prefix regex"))
}

/// Turn freshly typed block text into the update to store.
///
/// The returned update always carries content. It carries a kind only when a
/// prefix matched; otherwise shortcodes are substituted and the block keeps
/// its current type.
pub fn interpret_typed_text(text: &str) -> BlockUpdate {
    for (prefix, prefix_kind) in PREFIXES {
        if let Some(rest) = text.strip_prefix(prefix) {
            return BlockUpdate::replace(prefix_kind.kind(), rest);
        }
    }

    if let Some(found) = ordered_prefix().find(text) {
        return BlockUpdate::replace(BlockKind::OrderedListItem, &text[found.end()..]);
    }

    if let Some(rest) = text.strip_prefix("```") {
        let language = rest.trim();
        let language = (!language.is_empty()).then(|| language.to_string());
        return BlockUpdate::replace(BlockKind::Code { language }, "");
    }

    if text.starts_with("---") {
        return BlockUpdate::replace(BlockKind::HorizontalRule, "");
    }

    BlockUpdate::with_content(replace_shortcodes(text))
}

/// Substitute every shortcode in `text` with its symbol
pub fn replace_shortcodes(text: &str) -> String {
    SHORTCODES
        .iter()
        .fold(text.to_string(), |acc, (code, symbol)| acc.replace(code, symbol))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("# Hello", BlockKind::Heading1, "Hello")]
    #[case("## Hello", BlockKind::Heading2, "Hello")]
    #[case("### Hello", BlockKind::Heading3, "Hello")]
    #[case("> quoted", BlockKind::Blockquote, "quoted")]
    #[case("- [ ] task", BlockKind::Checkbox { status: CheckStatus::Todo }, "task")]
    #[case("- [/] task", BlockKind::Checkbox { status: CheckStatus::InProgress }, "task")]
    #[case("- [x] task", BlockKind::Checkbox { status: CheckStatus::Done }, "task")]
    #[case("- item", BlockKind::UnorderedListItem, "item")]
    #[case("* item", BlockKind::UnorderedListItem, "item")]
    #[case("1. item", BlockKind::OrderedListItem, "item")]
    #[case("42. item", BlockKind::OrderedListItem, "item")]
    #[case("```rust", BlockKind::Code { language: Some("rust".to_string()) }, "")]
    #[case("```", BlockKind::Code { language: None }, "")]
    #[case("```  py  ", BlockKind::Code { language: Some("py".to_string()) }, "")]
    #[case("---", BlockKind::HorizontalRule, "")]
    fn test_prefix_converts_type(
        #[case] typed: &str,
        #[case] kind: BlockKind,
        #[case] content: &str,
    ) {
        let update = interpret_typed_text(typed);
        assert_eq!(update.kind, Some(kind));
        assert_eq!(update.content.as_deref(), Some(content));
    }

    #[rstest]
    #[case("#no space")]
    #[case("#### Four")]
    #[case("-item")]
    #[case("1.item")]
    #[case("١. arabic-indic digit")]
    #[case("３. fullwidth digit")]
    #[case("plain text")]
    #[case("")]
    fn test_non_prefix_keeps_type(#[case] typed: &str) {
        let update = interpret_typed_text(typed);
        assert_eq!(update.kind, None);
        assert_eq!(update.content.as_deref(), Some(typed));
    }

    #[test]
    fn test_checkbox_prefix_wins_over_bullet() {
        let update = interpret_typed_text("- [x] done");
        assert_eq!(
            update.kind,
            Some(BlockKind::Checkbox {
                status: CheckStatus::Done
            })
        );
    }

    #[test]
    fn test_prefix_text_is_not_shortcode_substituted() {
        let update = interpret_typed_text("- a -> b");
        assert_eq!(update.content.as_deref(), Some("a -> b"));
    }

    #[rstest]
    #[case("a -> b", "a → b")]
    #[case("a <- b", "a ← b")]
    #[case("a <-> b", "a ↔ b")]
    #[case("x => y", "x ⇒ y")]
    #[case("x != y", "x ≠ y")]
    #[case("wait...", "wait…")]
    #[case("(c) 2024 Acme(tm)", "© 2024 Acme™")]
    #[case("nothing here", "nothing here")]
    fn test_shortcodes(#[case] typed: &str, #[case] expected: &str) {
        assert_eq!(replace_shortcodes(typed), expected);
        assert_eq!(
            interpret_typed_text(typed).content.as_deref(),
            Some(expected)
        );
    }
}
