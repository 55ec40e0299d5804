//! The edit-command engine: `(state, command) -> state`.
//!
//! Commands are dispatched in two stages. Registered edit middleware is
//! offered the command first, in registration order; the first hook that
//! returns an [`EditOutcome`] wins. Otherwise the core default for the
//! command runs. Either way the resulting source goes through the full
//! parse → normalize → serialize pipeline, so the next state is canonical
//! by construction.
//!
//! Every command is total. A command that cannot apply (backspace at offset
//! zero, unknown extension command) returns the previous state unchanged.

mod delete;
mod toggle;

use tracing::debug;

use crate::config::RuntimeConfig;
use crate::runtime::{EditorState, Runtime};
use crate::segment;
use crate::sourcemap::{Affinity, Selection};

/// One user intent, already stripped of input-device detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditCommand {
    /// Insert literal text at the selection.
    Insert(String),
    DeleteBackward,
    DeleteForward,
    /// Split the current block at the caret.
    InsertLineBreak,
    Indent,
    Outdent,
    /// Toggle the inline wrapper kind over the selection, or arm it as a
    /// pending mark at a collapsed caret.
    ToggleInline(String),
    /// Insert external text, after offering it to registered paste hooks.
    Paste(String),
    /// A named command meaningful only to an extension's edit middleware.
    Extension(String),
}

/// A fully handled edit: the next source text and selection.
#[derive(Debug, Clone, PartialEq)]
pub struct EditOutcome {
    pub source: String,
    pub selection: Selection,
}

/// Context handed to edit middleware.
pub struct EditCx<'r> {
    pub(crate) config: &'r RuntimeConfig,
}

impl<'r> EditCx<'r> {
    pub fn config(&self) -> &RuntimeConfig {
        self.config
    }
}

pub(crate) fn apply_edit(
    runtime: &Runtime,
    state: &EditorState,
    command: &EditCommand,
) -> EditorState {
    debug!(
        command = command_name(command),
        start = state.selection.start,
        "apply edit"
    );
    let cx = EditCx {
        config: runtime.config(),
    };
    for (_, hook) in &runtime.registry().on_edit {
        if let Some(outcome) = hook(command, state, &cx) {
            return finish(runtime, outcome);
        }
    }
    match command {
        EditCommand::Insert(text) => insert_text(runtime, state, text),
        EditCommand::Paste(text) => {
            let rewritten = runtime
                .registry()
                .on_paste
                .iter()
                .find_map(|(_, hook)| hook(text))
                .unwrap_or_else(|| text.clone());
            insert_text(runtime, state, &rewritten)
        }
        EditCommand::DeleteBackward => {
            let sel = state.selection;
            let range = if sel.is_caret() {
                if sel.start == 0 {
                    return state.clone();
                }
                sel.start - 1..sel.start
            } else {
                sel.start..sel.end
            };
            finish(runtime, delete::delete_range(state, range))
        }
        EditCommand::DeleteForward => {
            let sel = state.selection;
            let range = if sel.is_caret() {
                sel.start..sel.start + 1
            } else {
                sel.start..sel.end
            };
            finish(runtime, delete::delete_range(state, range))
        }
        EditCommand::InsertLineBreak => insert_line_break(runtime, state),
        // Indentation is markup-specific; without middleware it is a no-op.
        EditCommand::Indent | EditCommand::Outdent => state.clone(),
        EditCommand::ToggleInline(kind) => toggle::toggle_inline(runtime, state, kind),
        EditCommand::Extension(_) => state.clone(),
    }
}

// Command text is user content and must stay out of the logs.
fn command_name(command: &EditCommand) -> &'static str {
    match command {
        EditCommand::Insert(_) => "insert",
        EditCommand::DeleteBackward => "delete-backward",
        EditCommand::DeleteForward => "delete-forward",
        EditCommand::InsertLineBreak => "insert-line-break",
        EditCommand::Indent => "indent",
        EditCommand::Outdent => "outdent",
        EditCommand::ToggleInline(_) => "toggle-inline",
        EditCommand::Paste(_) => "paste",
        EditCommand::Extension(_) => "extension",
    }
}

fn finish(runtime: &Runtime, outcome: EditOutcome) -> EditorState {
    runtime.create_state(&outcome.source, Some(outcome.selection))
}

fn insert_text(runtime: &Runtime, state: &EditorState, text: &str) -> EditorState {
    let collapsed;
    let state = if state.selection.is_caret() {
        state
    } else {
        collapsed = finish(
            runtime,
            delete::delete_range(state, state.selection.start..state.selection.end),
        );
        &collapsed
    };
    if !state.pending_marks.is_empty()
        && !text.contains('\n')
        && let Some(next) = toggle::insert_with_marks(runtime, state, text)
    {
        return next;
    }
    let caret = state.selection.start;
    let at = state.map.cursor_to_source(caret, state.selection.affinity);
    let mut source = state.source.clone();
    source.insert_str(at, text);
    let caret = caret + segment::grapheme_count(text);
    runtime.create_state(
        &source,
        Some(Selection::caret_with_affinity(caret, state.selection.affinity)),
    )
}

fn insert_line_break(runtime: &Runtime, state: &EditorState) -> EditorState {
    let collapsed;
    let state = if state.selection.is_caret() {
        state
    } else {
        collapsed = finish(
            runtime,
            delete::delete_range(state, state.selection.start..state.selection.end),
        );
        &collapsed
    };
    // A break lands after any markers at the caret so the split never cuts
    // a marker pair in half.
    let caret = state.selection.start;
    let at = state.map.cursor_to_source(caret, Affinity::Forward);
    let mut source = state.source.clone();
    source.insert(at, '\n');
    runtime.create_state(
        &source,
        Some(Selection::caret_with_affinity(caret + 1, Affinity::Forward)),
    )
}
