/*!
 * # prosemark-engine
 *
 * Syntax-agnostic core of a markdown-like structured text editor. The engine
 * maintains three coupled representations of a document:
 *
 * - the **canonical source** string (the persisted markdown-like text),
 * - the **document tree** (`Doc` / `Block` / `Inline`) parsed from it,
 * - the **cursor-source map** translating between cursor offsets (what the
 *   user perceives, counted in grapheme/atom units) and source offsets
 *   (positions in the literal text, including syntax markers).
 *
 * The engine itself knows no concrete markup. All syntax is contributed by
 * extensions registered on a [`Runtime`](runtime::Runtime): parse rules,
 * serialize rules, normalize hooks, edit middleware, paste hooks, keybindings,
 * caret affinities and toggle-marker declarations. The engine composes them
 * into one parse → normalize → serialize pipeline and an edit-command engine
 * operating on `(source, selection)` pairs.
 *
 * ## Pipeline
 *
 * ```text
 * source ─parse→ Doc ─normalize→ Doc ─serialize→ (canonical source, map, layout)
 * ```
 *
 * Every edit command re-derives this state wholesale via
 * [`Runtime::create_state`](runtime::Runtime::create_state); partial or
 * inconsistent states are never exposed. Parsing is total: malformed or
 * ambiguous markup falls back to literal text.
 */

pub mod config;
pub mod edit;
pub mod error;
pub mod model;
pub mod runtime;
pub mod segment;
pub mod sourcemap;

pub use config::{IndentStyle, RuntimeConfig};
pub use edit::{EditCommand, EditCx, EditOutcome};
pub use error::EngineError;
pub use model::{Block, Doc, Inline, NodeData};
pub use runtime::{
    BlockMatch, CaretPlacement, EditorState, Extension, ExtensionHost, InlineMatch, ParseCx,
    Registration, Runtime, SerializeCx, Serialized, Teardown,
};
pub use sourcemap::{
    Affinity, Boundary, CursorSourceBuilder, CursorSourceMap, Layout, NodeLayout, Selection,
};
