//! Runtime assembly: a configured pipeline composed from extensions.
//!
//! A [`Runtime`] owns the rule registry and the configuration. Extensions
//! are registered at construction (or later) and can be torn down again;
//! everything else is pure: the runtime derives an [`EditorState`] from a
//! source string and the edit engine derives the next state from the
//! previous one plus a command.

pub mod host;
mod normalize;
pub mod parse;
pub mod serialize;

pub use host::{
    BlockMatch, CaretPlacement, Extension, ExtensionHost, InlineMatch, Keybinding,
    NormalizeBlockRule, NormalizeInlineRule, OnEditRule, OnPasteRule, ParseBlockRule,
    ParseInlineRule, Registration, SerializeBlockRule, SerializeInlineRule, Teardown,
    ToggleMarker, WrapperAffinity,
};
pub use parse::ParseCx;
pub use serialize::SerializeCx;

pub use crate::sourcemap::Serialized;

use tracing::debug;

use crate::config::RuntimeConfig;
use crate::edit::{self, EditCommand};
use crate::error::EngineError;
use crate::model::{Block, Doc};
use crate::runtime::host::Registry;
use crate::sourcemap::{CursorSourceMap, Layout, NodeLayout, Selection};

/// Everything the edit engine needs about one revision of a document.
///
/// States are immutable snapshots: every edit produces a fresh one by
/// re-running the full pipeline, so `source` is always canonical and `doc`,
/// `map` and `layout` are always derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorState {
    /// Canonical serialized source.
    pub source: String,
    /// Document tree parsed from (and normalized against) `source`.
    pub doc: Doc,
    /// Cursor-offset to source-offset translation for `source`.
    pub map: CursorSourceMap,
    /// Cursor-space extents of the serialized nodes.
    pub layout: Layout,
    /// Current selection, clamped to the document.
    pub selection: Selection,
    /// Inline wrapper kinds toggled on at a collapsed caret, to be applied
    /// to the next insertion. Toggling a kind twice removes it again.
    pub pending_marks: Vec<String>,
}

impl EditorState {
    /// Chain of blocks containing a cursor offset, outermost first, paired
    /// with each block's cursor-space layout. Edit middleware uses this to
    /// decide whether a command falls inside markup it owns.
    pub fn block_path_at(&self, cursor: usize) -> Vec<(&Block, &NodeLayout)> {
        let mut path = Vec::new();
        let mut blocks = self.doc.blocks.as_slice();
        let mut nodes = self.layout.as_slice();
        loop {
            let Some(index) = nodes
                .iter()
                .position(|n| n.cursor_range.start <= cursor && cursor <= n.cursor_range.end)
            else {
                return path;
            };
            let Some(block) = blocks.get(index) else {
                return path;
            };
            path.push((block, &nodes[index]));
            match block {
                Block::Wrapper {
                    blocks: children, ..
                } => {
                    blocks = children.as_slice();
                    nodes = nodes[index].children.as_slice();
                }
                Block::Paragraph { .. } | Block::Atom { .. } => return path,
            }
        }
    }
}

/// A configured engine: registry of extension rules plus runtime settings.
pub struct Runtime {
    config: RuntimeConfig,
    registry: Registry,
}

impl Runtime {
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            config,
            registry: Registry::default(),
        }
    }

    /// Build a runtime and register a batch of extensions in order.
    pub fn with_extensions(
        config: RuntimeConfig,
        extensions: impl IntoIterator<Item = Extension>,
    ) -> Self {
        let mut runtime = Self::new(config);
        for extension in extensions {
            runtime.register(extension);
        }
        runtime
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub(crate) fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Run one extension closure against the registry. Registration order is
    /// rule priority: earlier extensions win ambiguous parses.
    pub fn register(&mut self, extension: Extension) -> Option<Teardown> {
        let mut host = ExtensionHost {
            registry: &mut self.registry,
        };
        extension(&mut host)
    }

    /// Revoke a batch of registrations previously returned by [`register`].
    ///
    /// [`register`]: Runtime::register
    pub fn teardown(&mut self, teardown: Teardown) {
        for registration in teardown.registrations {
            self.registry.unregister(registration);
        }
    }

    /// Parse a source string into a document tree. Total: unmatched input
    /// becomes literal paragraphs.
    pub fn parse(&self, source: &str) -> Doc {
        let cx = ParseCx {
            registry: &self.registry,
            config: &self.config,
        };
        Doc {
            blocks: cx.parse_blocks(source),
        }
    }

    /// Run all normalize hooks plus the core shape rules, bottom-up.
    pub fn normalize(&self, doc: Doc) -> Doc {
        normalize::normalize_doc(&self.registry, doc)
    }

    /// Serialize a document tree to canonical source with its map and layout.
    pub fn serialize(&self, doc: &Doc) -> Serialized {
        let cx = SerializeCx {
            registry: &self.registry,
            config: &self.config,
            siblings: &doc.blocks,
            index: 0,
            depth: 0,
        };
        cx.serialize_blocks(&doc.blocks)
    }

    /// Derive a full editor state from a source string: parse, normalize,
    /// serialize, clamp the selection to the resulting cursor length.
    pub fn create_state(&self, source: &str, selection: Option<Selection>) -> EditorState {
        let doc = self.normalize(self.parse(source));
        let serialized = self.serialize(&doc);
        if serialized.source != source {
            debug!(
                input_len = source.len(),
                canonical_len = serialized.source.len(),
                "source canonicalized"
            );
        }
        let selection = selection
            .unwrap_or_else(|| Selection::caret(0))
            .clamped(serialized.map.cursor_len());
        EditorState {
            source: serialized.source,
            doc,
            map: serialized.map,
            layout: serialized.layout,
            selection,
            pending_marks: Vec::new(),
        }
    }

    /// Like [`create_state`], for byte buffers of unknown encoding. The only
    /// fallible entry point of the engine.
    ///
    /// [`create_state`]: Runtime::create_state
    pub fn create_state_from_bytes(
        &self,
        bytes: &[u8],
        selection: Option<Selection>,
    ) -> Result<EditorState, EngineError> {
        let source = std::str::from_utf8(bytes)?;
        Ok(self.create_state(source, selection))
    }

    /// Apply one edit command, producing the next state. Total: commands
    /// that cannot apply return the state unchanged (modulo canonicalization).
    pub fn apply(&self, state: &EditorState, command: &EditCommand) -> EditorState {
        edit::apply_edit(self, state, command)
    }

    /// Resolve a key chord (e.g. `"Mod-b"`) against registered keybindings.
    pub fn command_for_key(&self, key: &str) -> Option<EditCommand> {
        self.registry
            .keybindings
            .iter()
            .find(|(_, binding)| binding.key == key)
            .map(|(_, binding)| binding.command.clone())
    }
}
