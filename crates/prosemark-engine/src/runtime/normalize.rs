//! Normalization: a bottom-up clean-up pass between parse and serialize.
//!
//! Children are normalized first, then every registered hook is offered the
//! node in order (`Some` keeps or replaces, `None` deletes). The core then
//! applies its own shape rules: empty text runs vanish, adjacent text runs
//! merge, and wrappers left without children are deleted; toggling a style
//! off on fully deleted content must not leave an empty marker pair behind.
//!
//! The pass is idempotent for well-behaved hooks: a normalized tree passes
//! through unchanged.

use crate::model::{Block, Doc, Inline};
use crate::runtime::host::Registry;

pub(crate) fn normalize_doc(registry: &Registry, doc: Doc) -> Doc {
    Doc {
        blocks: normalize_blocks(registry, doc.blocks),
    }
}

pub(crate) fn normalize_blocks(registry: &Registry, blocks: Vec<Block>) -> Vec<Block> {
    blocks
        .into_iter()
        .filter_map(|block| normalize_block(registry, block))
        .collect()
}

fn normalize_block(registry: &Registry, block: Block) -> Option<Block> {
    let mut block = match block {
        Block::Paragraph { content } => Block::Paragraph {
            content: normalize_inlines(registry, content),
        },
        Block::Wrapper { kind, blocks } => Block::Wrapper {
            kind,
            blocks: normalize_blocks(registry, blocks),
        },
        atom => atom,
    };
    for (_, hook) in &registry.normalize_block {
        block = hook(block)?;
    }
    match &block {
        Block::Wrapper { blocks, .. } if blocks.is_empty() => None,
        _ => Some(block),
    }
}

pub(crate) fn normalize_inlines(registry: &Registry, inlines: Vec<Inline>) -> Vec<Inline> {
    let mut out: Vec<Inline> = Vec::new();
    for inline in inlines {
        let Some(inline) = normalize_inline(registry, inline) else {
            continue;
        };
        if let Inline::Text { text } = &inline
            && let Some(Inline::Text { text: previous }) = out.last_mut()
        {
            previous.push_str(text);
            continue;
        }
        out.push(inline);
    }
    out
}

fn normalize_inline(registry: &Registry, inline: Inline) -> Option<Inline> {
    let mut inline = match inline {
        Inline::Wrapper {
            kind,
            children,
            data,
        } => Inline::Wrapper {
            kind,
            children: normalize_inlines(registry, children),
            data,
        },
        other => other,
    };
    for (_, hook) in &registry.normalize_inline {
        inline = hook(inline)?;
    }
    match &inline {
        Inline::Text { text } if text.is_empty() => None,
        Inline::Wrapper { children, .. } if children.is_empty() => None,
        _ => Some(inline),
    }
}
