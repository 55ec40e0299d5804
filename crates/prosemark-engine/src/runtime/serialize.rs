//! The serialize pipeline: first-match rule dispatch building the canonical
//! source, the cursor-source map and the layout tree depth-first.
//!
//! Serialization is deterministic: identical trees always produce identical
//! source text. Unknown kinds stay opaque: wrappers pass their children
//! through, atoms emit their `"raw"` data entry, so the generic walk never
//! string-matches extension syntax.

use tracing::trace;

use crate::config::RuntimeConfig;
use crate::model::{Block, Inline};
use crate::runtime::host::Registry;
use crate::sourcemap::{CursorSourceBuilder, Serialized};

/// Context handed to serialize rules. Block rules additionally see their
/// node's siblings and position, which lets order-sensitive markup (ordered
/// list numbering) derive its output without storing it in the model.
pub struct SerializeCx<'r> {
    pub(crate) registry: &'r Registry,
    pub(crate) config: &'r RuntimeConfig,
    pub siblings: &'r [Block],
    pub index: usize,
    pub(crate) depth: usize,
}

impl<'r> SerializeCx<'r> {
    pub fn config(&self) -> &RuntimeConfig {
        self.config
    }

    /// Nesting depth of the block being serialized; indenting markup
    /// multiplies its unit by this.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// One line's worth of indentation at the current depth.
    pub fn line_indent(&self) -> String {
        self.config.indent.unit().repeat(self.depth)
    }

    /// Serialize sibling blocks, separated by visible newlines.
    pub fn serialize_blocks(&self, blocks: &[Block]) -> Serialized {
        let mut builder = CursorSourceBuilder::new();
        for index in 0..blocks.len() {
            if index > 0 {
                builder.append_text("\n");
            }
            builder.append_serialized(self.serialize_block_at(blocks, index, self.depth));
        }
        builder.build()
    }

    /// Serialize one block with its sibling context, at the current depth.
    /// Rules that interleave their own markers between children (quote
    /// prefixes, item indentation) call this instead of
    /// [`serialize_blocks`](Self::serialize_blocks).
    pub fn serialize_child<'a>(&'a self, siblings: &'a [Block], index: usize) -> Serialized {
        self.serialize_block_at(siblings, index, self.depth)
    }

    /// Like [`serialize_child`](Self::serialize_child), one nesting level
    /// deeper.
    pub fn serialize_child_indented<'a>(&'a self, siblings: &'a [Block], index: usize) -> Serialized {
        self.serialize_block_at(siblings, index, self.depth + 1)
    }

    fn serialize_block_at<'a>(&'a self, siblings: &'a [Block], index: usize, depth: usize) -> Serialized {
        let block = &siblings[index];
        let cx = SerializeCx {
            registry: self.registry,
            config: self.config,
            siblings,
            index,
            depth,
        };
        let fragment = self
            .registry
            .serialize_block
            .iter()
            .find_map(|(_, rule)| rule(block, &cx))
            .unwrap_or_else(|| {
                trace!("no block serializer matched; using fallback");
                cx.fallback_block(block)
            });
        fragment.into_node()
    }

    fn fallback_block(&self, block: &Block) -> Serialized {
        match block {
            Block::Paragraph { content } => self.serialize_inlines(content),
            // Opaque wrapper: children pass through unchanged.
            Block::Wrapper { blocks, .. } => self.serialize_blocks(blocks),
            Block::Atom { data, .. } => {
                let mut builder = CursorSourceBuilder::new();
                builder.append_cursor_atom(data.get("raw").map(String::as_str).unwrap_or(""), 1);
                builder.build()
            }
        }
    }

    /// Serialize a run of inline nodes.
    pub fn serialize_inlines(&self, inlines: &[Inline]) -> Serialized {
        let mut builder = CursorSourceBuilder::new();
        for inline in inlines {
            builder.append_serialized(self.serialize_inline_node(inline));
        }
        builder.build()
    }

    fn serialize_inline_node(&self, inline: &Inline) -> Serialized {
        let fragment = self
            .registry
            .serialize_inline
            .iter()
            .find_map(|(_, rule)| rule(inline, self))
            .unwrap_or_else(|| self.fallback_inline(inline));
        fragment.into_node()
    }

    fn fallback_inline(&self, inline: &Inline) -> Serialized {
        let mut builder = CursorSourceBuilder::new();
        match inline {
            Inline::Text { text } => builder.append_text(text),
            Inline::Wrapper { children, .. } => return self.serialize_inlines(children),
            Inline::Atom { data, .. } => {
                builder.append_cursor_atom(data.get("raw").map(String::as_str).unwrap_or(""), 1)
            }
        }
        builder.build()
    }
}
