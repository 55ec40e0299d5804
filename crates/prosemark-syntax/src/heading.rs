//! ATX headings: `# ` through `###### `.
//!
//! A heading is a wrapper (`heading-1` .. `heading-6`) around a single
//! paragraph. The hash prefix is visible text, so deleting into it demotes
//! the heading to a plain paragraph through the engine's generic prefix
//! handling.

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

fn parse(source: &str, cx: &ParseCx<'_>) -> Option<BlockMatch> {
    let line_end = source.find('\n').unwrap_or(source.len());
    let line = &source[..line_end];
    let level = line.bytes().take_while(|&b| b == b'#').count();
    if !(1..=6).contains(&level) {
        return None;
    }
    let content = line[level..].strip_prefix(' ')?;
    Some(BlockMatch {
        block: Block::wrapper(
            kind::heading(level),
            vec![Block::paragraph(cx.parse_inlines(content))],
        ),
        consumed: line_end,
    })
}

fn serialize(block: &Block, cx: &SerializeCx<'_>) -> Option<Serialized> {
    let Block::Wrapper { kind, blocks } = block else {
        return None;
    };
    let level: usize = kind.strip_prefix("heading-")?.parse().ok()?;
    if !(1..=6).contains(&level) {
        return None;
    }
    let mut builder = CursorSourceBuilder::new();
    builder.append_text(&format!("{} ", "#".repeat(level)));
    for index in 0..blocks.len() {
        if index > 0 {
            builder.append_text("\n");
        }
        builder.append_serialized(cx.serialize_child(blocks, index));
    }
    Some(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use prosemark_engine::{Runtime, RuntimeConfig};
    use pretty_assertions::assert_eq;

    fn runtime() -> Runtime {
        Runtime::with_extensions(RuntimeConfig::default(), vec![extension()])
    }

    #[test]
    fn heading_levels_round_trip() {
        let rt = runtime();
        for level in 1..=6 {
            let source = format!("{} title", "#".repeat(level));
            let state = rt.create_state(&source, None);
            assert_eq!(state.source, source);
            // Prefix slots are visible: hashes, space, then the title.
            assert_eq!(state.map.cursor_len(), level + 1 + 5);
        }
    }

    #[test]
    fn seven_hashes_is_not_a_heading() {
        let rt = runtime();
        let doc = rt.parse("####### x");
        assert!(matches!(doc.blocks[0], Block::Paragraph { .. }));
    }

    #[test]
    fn hash_without_space_is_not_a_heading() {
        let rt = runtime();
        let doc = rt.parse("#tag");
        assert!(matches!(doc.blocks[0], Block::Paragraph { .. }));
    }
}
