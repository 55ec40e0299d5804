//! The document tree: tagged unions for blocks and inlines.
//!
//! Produced by parsing, consumed by serialization and by rendering layers.
//! Children are exclusively owned top-down; there are no parent pointers, so
//! the tree is acyclic by construction. A `Doc` is replaced wholesale on
//! every edit; nothing mutates it in place across edits.
//!
//! Node `kind` strings and `data` payloads are opaque to the engine; only the
//! extensions that registered rules for a kind interpret them.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::segment;

/// Opaque side data carried by wrappers and atoms (e.g. a link URL).
pub type NodeData = BTreeMap<String, String>;

/// Root of a parsed document: an ordered sequence of blocks.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Doc {
    pub blocks: Vec<Block>,
}

/// A block-level node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Block {
    /// Leaf text container.
    Paragraph { content: Vec<Inline> },
    /// Structural nesting (blockquote, list item); owns its child blocks.
    Wrapper { kind: String, blocks: Vec<Block> },
    /// Non-decomposable block (image); one cursor slot, no children.
    Atom { kind: String, data: NodeData },
}

/// An inline node inside a paragraph.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Inline {
    /// A run of visible text.
    Text { text: String },
    /// Markup wrapping visible content (strong, link); markers are
    /// source-only, so the wrapper contributes no cursor slots of its own.
    Wrapper {
        kind: String,
        children: Vec<Inline>,
        data: NodeData,
    },
    /// Non-decomposable inline unit (mention); exactly one cursor slot,
    /// inserted and deleted as a whole.
    Atom { kind: String, data: NodeData },
}

impl Doc {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }
}

impl Block {
    pub fn paragraph(content: Vec<Inline>) -> Self {
        Block::Paragraph { content }
    }

    pub fn wrapper(kind: impl Into<String>, blocks: Vec<Block>) -> Self {
        Block::Wrapper {
            kind: kind.into(),
            blocks,
        }
    }

    pub fn atom(kind: impl Into<String>, data: NodeData) -> Self {
        Block::Atom {
            kind: kind.into(),
            data,
        }
    }
}

impl Inline {
    pub fn text(text: impl Into<String>) -> Self {
        Inline::Text { text: text.into() }
    }

    pub fn wrapper(kind: impl Into<String>, children: Vec<Inline>) -> Self {
        Inline::Wrapper {
            kind: kind.into(),
            children,
            data: NodeData::new(),
        }
    }

    pub fn wrapper_with_data(kind: impl Into<String>, children: Vec<Inline>, data: NodeData) -> Self {
        Inline::Wrapper {
            kind: kind.into(),
            children,
            data,
        }
    }

    pub fn atom(kind: impl Into<String>, data: NodeData) -> Self {
        Inline::Atom {
            kind: kind.into(),
            data,
        }
    }

    /// Number of cursor slots this inline occupies. Markers are source-only,
    /// so a wrapper's width is the sum of its children; an atom is always one
    /// slot regardless of its source length.
    pub fn cursor_width(&self) -> usize {
        match self {
            Inline::Text { text } => segment::grapheme_count(text),
            Inline::Wrapper { children, .. } => children.iter().map(Inline::cursor_width).sum(),
            Inline::Atom { .. } => 1,
        }
    }
}
