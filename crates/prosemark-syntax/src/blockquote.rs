//! Blockquotes: consecutive `> `-prefixed lines form one quote wrapper.
//!
//! Each quoted line is a child paragraph; the quote markers (leading and
//! between-line) are visible text. Quotes do not nest: a `> ` inside a
//! quoted line stays literal, which keeps the serialized form canonical
//! line-by-line.

use prosemark_engine::{
    Block, BlockMatch, CursorSourceBuilder, Extension, ParseCx, SerializeCx, Serialized, Teardown,
};

use crate::kind;

pub fn extension() -> Extension {
    Box::new(|host| {
        let registrations = vec![
            host.register_parse_block(Box::new(parse)),
            host.register_serialize_block(Box::new(serialize)),
        ];
        Some(Teardown::new(registrations))
    })
}

fn quoted_line(line: &str) -> Option<&str> {
    line.strip_prefix("> ").or_else(|| line.strip_prefix('>'))
}

fn parse(source: &str, cx: &ParseCx<'_>) -> Option<BlockMatch> {
    let mut children = Vec::new();
    let mut consumed = 0;
    let mut rest = source;
    loop {
        let line_end = rest.find('\n').unwrap_or(rest.len());
        let Some(content) = quoted_line(&rest[..line_end]) else {
            break;
        };
        if !children.is_empty() {
            consumed += 1; // the newline before this line
        }
        children.push(Block::paragraph(cx.parse_inlines(content)));
        consumed += line_end;
        if line_end == rest.len() || rest[line_end + 1..].is_empty() {
            break;
        }
        rest = &rest[line_end + 1..];
    }
    if children.is_empty() {
        return None;
    }
    Some(BlockMatch {
        block: Block::wrapper(kind::BLOCKQUOTE, children),
        consumed,
    })
}

fn serialize(block: &Block, cx: &SerializeCx<'_>) -> Option<Serialized> {
    let Block::Wrapper { kind, blocks } = block else {
        return None;
    };
    if kind != crate::kind::BLOCKQUOTE {
        return None;
    }
    let mut builder = CursorSourceBuilder::new();
    for index in 0..blocks.len() {
        if index > 0 {
            builder.append_text("\n");
        }
        builder.append_text("> ");
        builder.append_serialized(cx.serialize_child(blocks, index));
    }
    Some(builder.build())
}
