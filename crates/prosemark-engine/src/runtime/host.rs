//! Extension registration: the host object handed to every extension.
//!
//! An extension is a single closure invoked once at runtime construction; it
//! receives an [`ExtensionHost`] and may return a [`Teardown`] bundling the
//! registrations it wants to be able to revoke. There is no base trait and no
//! required method set beyond that closure.
//!
//! Every registry is append-only and order-sensitive: parse and serialize
//! rules are tried first-registered-first. Grammars can be ambiguous, so the
//! first match wins and rules must use unambiguous look-ahead; there is no
//! backtracking across competing grammars. Normalize hooks all run, in
//! order.

use crate::edit::{EditCommand, EditCx, EditOutcome};
use crate::model::{Block, Inline};
use crate::runtime::EditorState;
use crate::runtime::parse::ParseCx;
use crate::runtime::serialize::SerializeCx;
use crate::sourcemap::Serialized;

/// A successful block-rule match: the parsed block and how many source bytes
/// it consumed. Multi-line blocks consume their continuation lines but never
/// the newline after their last line.
pub struct BlockMatch {
    pub block: Block,
    pub consumed: usize,
}

/// A successful inline-rule match.
pub struct InlineMatch {
    pub inline: Inline,
    pub consumed: usize,
}

pub type ParseBlockRule = Box<dyn Fn(&str, &ParseCx<'_>) -> Option<BlockMatch>>;
pub type ParseInlineRule = Box<dyn Fn(&str, &ParseCx<'_>) -> Option<InlineMatch>>;
pub type SerializeBlockRule = Box<dyn Fn(&Block, &SerializeCx<'_>) -> Option<Serialized>>;
pub type SerializeInlineRule = Box<dyn Fn(&Inline, &SerializeCx<'_>) -> Option<Serialized>>;
/// Normalize hooks take the node by value and return `Some` (kept or
/// replaced) or `None` (deleted). All registered hooks run, bottom-up.
pub type NormalizeBlockRule = Box<dyn Fn(Block) -> Option<Block>>;
pub type NormalizeInlineRule = Box<dyn Fn(Inline) -> Option<Inline>>;
/// Edit middleware: fully handle a command by returning a new source and
/// selection, or decline with `None` to fall through to the core default.
pub type OnEditRule = Box<dyn Fn(&EditCommand, &EditorState, &EditCx<'_>) -> Option<EditOutcome>>;
/// Paste hook: rewrite pasted plain text into source markup, or decline.
pub type OnPasteRule = Box<dyn Fn(&str) -> Option<String>>;

/// Whether a caret exactly at this wrapper kind's marker edge counts as
/// inside the marker (typing extends the wrapper) or outside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaretPlacement {
    Inside,
    Outside,
}

/// Declared caret affinity for one inline wrapper kind.
#[derive(Debug, Clone)]
pub struct WrapperAffinity {
    pub kind: String,
    pub placement: CaretPlacement,
}

/// A toggleable inline marker: the wrapper kind it produces and its literal
/// opening/closing markers (identical for symmetric markers like `**`).
#[derive(Debug, Clone)]
pub struct ToggleMarker {
    pub kind: String,
    pub open: String,
    pub close: String,
}

/// A key chord bound to an edit command, e.g. `"Mod-b"` → toggle strong.
#[derive(Debug, Clone)]
pub struct Keybinding {
    pub key: String,
    pub command: EditCommand,
}

/// The closure contract every extension satisfies.
pub type Extension = Box<dyn FnOnce(&mut ExtensionHost<'_>) -> Option<Teardown>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Category {
    ParseBlock,
    ParseInline,
    SerializeBlock,
    SerializeInline,
    NormalizeBlock,
    NormalizeInline,
    OnEdit,
    OnPaste,
    Keybinding,
    WrapperAffinity,
    ToggleInline,
}

/// Handle for one registration; feeds a [`Teardown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registration {
    pub(crate) category: Category,
    pub(crate) id: u64,
}

/// The registrations an extension wants revocable as one unit.
#[derive(Debug, Default)]
pub struct Teardown {
    pub(crate) registrations: Vec<Registration>,
}

impl Teardown {
    pub fn new(registrations: Vec<Registration>) -> Self {
        Self { registrations }
    }
}

impl FromIterator<Registration> for Teardown {
    fn from_iter<T: IntoIterator<Item = Registration>>(iter: T) -> Self {
        Self {
            registrations: iter.into_iter().collect(),
        }
    }
}

#[derive(Default)]
pub(crate) struct Registry {
    pub(crate) parse_block: Vec<(u64, ParseBlockRule)>,
    pub(crate) parse_inline: Vec<(u64, ParseInlineRule)>,
    pub(crate) serialize_block: Vec<(u64, SerializeBlockRule)>,
    pub(crate) serialize_inline: Vec<(u64, SerializeInlineRule)>,
    pub(crate) normalize_block: Vec<(u64, NormalizeBlockRule)>,
    pub(crate) normalize_inline: Vec<(u64, NormalizeInlineRule)>,
    pub(crate) on_edit: Vec<(u64, OnEditRule)>,
    pub(crate) on_paste: Vec<(u64, OnPasteRule)>,
    pub(crate) keybindings: Vec<(u64, Keybinding)>,
    pub(crate) wrapper_affinities: Vec<(u64, WrapperAffinity)>,
    pub(crate) toggle_markers: Vec<(u64, ToggleMarker)>,
    next_id: u64,
}

impl Registry {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    pub(crate) fn unregister(&mut self, registration: Registration) {
        let id = registration.id;
        match registration.category {
            Category::ParseBlock => self.parse_block.retain(|(i, _)| *i != id),
            Category::ParseInline => self.parse_inline.retain(|(i, _)| *i != id),
            Category::SerializeBlock => self.serialize_block.retain(|(i, _)| *i != id),
            Category::SerializeInline => self.serialize_inline.retain(|(i, _)| *i != id),
            Category::NormalizeBlock => self.normalize_block.retain(|(i, _)| *i != id),
            Category::NormalizeInline => self.normalize_inline.retain(|(i, _)| *i != id),
            Category::OnEdit => self.on_edit.retain(|(i, _)| *i != id),
            Category::OnPaste => self.on_paste.retain(|(i, _)| *i != id),
            Category::Keybinding => self.keybindings.retain(|(i, _)| *i != id),
            Category::WrapperAffinity => self.wrapper_affinities.retain(|(i, _)| *i != id),
            Category::ToggleInline => self.toggle_markers.retain(|(i, _)| *i != id),
        }
    }

    pub(crate) fn toggle_marker_for_kind(&self, kind: &str) -> Option<&ToggleMarker> {
        self.toggle_markers.iter().map(|(_, m)| m).find(|m| m.kind == kind)
    }

    pub(crate) fn placement_for_kind(&self, kind: &str) -> CaretPlacement {
        self.wrapper_affinities
            .iter()
            .map(|(_, a)| a)
            .find(|a| a.kind == kind)
            .map(|a| a.placement)
            .unwrap_or(CaretPlacement::Outside)
    }
}

/// Registration surface handed to an extension closure.
pub struct ExtensionHost<'r> {
    pub(crate) registry: &'r mut Registry,
}

macro_rules! register_fn {
    ($name:ident, $field:ident, $rule:ty, $category:expr) => {
        pub fn $name(&mut self, rule: $rule) -> Registration {
            let id = self.registry.next_id();
            self.registry.$field.push((id, rule));
            Registration {
                category: $category,
                id,
            }
        }
    };
}

impl<'r> ExtensionHost<'r> {
    register_fn!(register_parse_block, parse_block, ParseBlockRule, Category::ParseBlock);
    register_fn!(register_parse_inline, parse_inline, ParseInlineRule, Category::ParseInline);
    register_fn!(
        register_serialize_block,
        serialize_block,
        SerializeBlockRule,
        Category::SerializeBlock
    );
    register_fn!(
        register_serialize_inline,
        serialize_inline,
        SerializeInlineRule,
        Category::SerializeInline
    );
    register_fn!(
        register_normalize_block,
        normalize_block,
        NormalizeBlockRule,
        Category::NormalizeBlock
    );
    register_fn!(
        register_normalize_inline,
        normalize_inline,
        NormalizeInlineRule,
        Category::NormalizeInline
    );
    register_fn!(register_on_edit, on_edit, OnEditRule, Category::OnEdit);
    register_fn!(register_on_paste_text, on_paste, OnPasteRule, Category::OnPaste);

    pub fn register_keybinding(
        &mut self,
        key: impl Into<String>,
        command: EditCommand,
    ) -> Registration {
        let id = self.registry.next_id();
        self.registry.keybindings.push((
            id,
            Keybinding {
                key: key.into(),
                command,
            },
        ));
        Registration {
            category: Category::Keybinding,
            id,
        }
    }

    pub fn register_inline_wrapper_affinity(
        &mut self,
        kind: impl Into<String>,
        placement: CaretPlacement,
    ) -> Registration {
        let id = self.registry.next_id();
        self.registry.wrapper_affinities.push((
            id,
            WrapperAffinity {
                kind: kind.into(),
                placement,
            },
        ));
        Registration {
            category: Category::WrapperAffinity,
            id,
        }
    }

    pub fn register_toggle_inline(
        &mut self,
        kind: impl Into<String>,
        open: impl Into<String>,
        close: impl Into<String>,
    ) -> Registration {
        let id = self.registry.next_id();
        self.registry.toggle_markers.push((
            id,
            ToggleMarker {
                kind: kind.into(),
                open: open.into(),
                close: close.into(),
            },
        ));
        Registration {
            category: Category::ToggleInline,
            id,
        }
    }
}
