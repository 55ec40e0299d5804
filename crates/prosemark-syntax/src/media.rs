//! Embedded media: `![alt](src)` image blocks and `@handle` mentions.
//!
//! Both are atoms: one cursor slot covering the whole source form, never
//! entered or split by the caret. An image must fill its line; a `![` with
//! trailing text stays literal.

use std::sync::LazyLock;

use regex::Regex;

use prosemark_engine::{
    Block, BlockMatch, CursorSourceBuilder, Extension, Inline, InlineMatch, NodeData, ParseCx,
    SerializeCx, Serialized, Teardown,
};

use crate::kind;

static IMAGE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^!\[([^\[\]]*)\]\(([^()]*)\)$").expect("static pattern"));
static MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@([A-Za-z0-9_]+)").expect("static pattern"));

pub fn extension() -> Extension {
    Box::new(|host| {
        let registrations = vec![
            host.register_parse_block(Box::new(parse_image)),
            host.register_serialize_block(Box::new(serialize_image)),
            host.register_parse_inline(Box::new(parse_mention)),
            host.register_serialize_inline(Box::new(serialize_mention)),
            host.register_normalize_inline(Box::new(drop_empty_mentions)),
        ];
        Some(Teardown::new(registrations))
    })
}

fn parse_image(source: &str, _cx: &ParseCx<'_>) -> Option<BlockMatch> {
    let line_end = source.find('\n').unwrap_or(source.len());
    let captures = IMAGE_LINE.captures(&source[..line_end])?;
    let mut data = NodeData::new();
    data.insert("alt".into(), captures[1].into());
    data.insert("src".into(), captures[2].into());
    Some(BlockMatch {
        block: Block::atom(kind::IMAGE, data),
        consumed: line_end,
    })
}

fn serialize_image(block: &Block, _cx: &SerializeCx<'_>) -> Option<Serialized> {
    let Block::Atom { kind, data } = block else {
        return None;
    };
    if kind != crate::kind::IMAGE {
        return None;
    }
    let alt = data.get("alt").map(String::as_str).unwrap_or("");
    let src = data.get("src").map(String::as_str).unwrap_or("");
    let mut builder = CursorSourceBuilder::new();
    builder.append_cursor_atom(&format!("![{alt}]({src})"), 1);
    Some(builder.build())
}

fn parse_mention(source: &str, _cx: &ParseCx<'_>) -> Option<InlineMatch> {
    let matched = MENTION.captures(source)?;
    let mut data = NodeData::new();
    data.insert("handle".into(), matched[1].into());
    Some(InlineMatch {
        inline: Inline::atom(kind::MENTION, data),
        consumed: matched[0].len(),
    })
}

fn serialize_mention(inline: &Inline, _cx: &SerializeCx<'_>) -> Option<Serialized> {
    let Inline::Atom { kind, data } = inline else {
        return None;
    };
    if kind != crate::kind::MENTION {
        return None;
    }
    let handle = data.get("handle").map(String::as_str).unwrap_or("");
    let mut builder = CursorSourceBuilder::new();
    builder.append_cursor_atom(&format!("@{handle}"), 1);
    Some(builder.build())
}

/// A mention with no handle (possible in programmatically built trees)
/// would serialize to a bare `@` and reparse as text; drop it instead.
fn drop_empty_mentions(inline: Inline) -> Option<Inline> {
    if let Inline::Atom { kind, data } = &inline
        && kind == crate::kind::MENTION
        && data.get("handle").is_none_or(|handle| handle.is_empty())
    {
        return None;
    }
    Some(inline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use prosemark_engine::{Affinity, Runtime, RuntimeConfig};
    use pretty_assertions::assert_eq;

    fn runtime() -> Runtime {
        Runtime::with_extensions(RuntimeConfig::default(), vec![extension()])
    }

    #[test]
    fn image_is_one_cursor_slot() {
        let rt = runtime();
        let state = rt.create_state("![cat](cat.png)", None);
        assert_eq!(state.map.cursor_len(), 1);
        assert_eq!(state.map.cursor_to_source(0, Affinity::Forward), 0);
        assert_eq!(state.map.cursor_to_source(1, Affinity::Backward), 15);
    }

    #[test]
    fn image_with_trailing_text_stays_literal() {
        let rt = runtime();
        let doc = rt.parse("![cat](cat.png) tail");
        assert!(matches!(doc.blocks[0], Block::Paragraph { .. }));
    }

    #[test]
    fn mention_round_trips_as_atom() {
        let rt = runtime();
        let state = rt.create_state("hi @ada!", None);
        assert_eq!(state.source, "hi @ada!");
        // h, i, space, the mention, bang
        assert_eq!(state.map.cursor_len(), 5);
    }

    #[test]
    fn bare_at_sign_is_text() {
        let rt = runtime();
        let state = rt.create_state("a @ b", None);
        assert_eq!(state.map.cursor_len(), 5);
    }
}
