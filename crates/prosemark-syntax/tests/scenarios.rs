//! End-to-end editing flows against the full bundled grammar.

use pretty_assertions::assert_eq;
use prosemark_engine::{
    Affinity, EditCommand, EngineError, Runtime, RuntimeConfig, Selection,
};
use prosemark_syntax::runtime;

fn rt() -> Runtime {
    runtime(RuntimeConfig::default())
}

#[test]
fn bold_markers_are_invisible_to_the_cursor() {
    let state = rt().create_state("**ab**", None);
    assert_eq!(state.map.cursor_len(), 2);
    assert_eq!(state.map.cursor_to_source(2, Affinity::Forward), 6);
    assert_eq!(state.map.cursor_to_source(2, Affinity::Backward), 4);
}

#[test]
fn empty_bold_normalizes_to_empty_source() {
    let state = rt().create_state("****", None);
    assert_eq!(state.source, "");
    assert_eq!(state.map.cursor_len(), 0);
}

#[test]
fn typing_at_bold_end_extends_the_bold_run() {
    let rt = rt();
    let state = rt.create_state(
        "**ab**",
        Some(Selection::caret_with_affinity(2, Affinity::Backward)),
    );
    let state = rt.apply(&state, &EditCommand::Insert("c".into()));
    assert_eq!(state.source, "**abc**");
    assert_eq!(state.selection.start, 3);
}

#[test]
fn backspace_into_bullet_prefix_demotes_to_paragraph() {
    let rt = rt();
    let state = rt.create_state("- item", Some(Selection::caret(2)));
    let state = rt.apply(&state, &EditCommand::DeleteBackward);
    assert_eq!(state.source, "item");
    assert_eq!(state.selection, Selection::caret(0));
}

#[test]
fn line_break_mid_list_renumbers_the_tail() {
    let rt = rt();
    let state = rt.create_state("1. one\n2. two\n3. three", Some(Selection::caret(6)));
    let state = rt.apply(&state, &EditCommand::InsertLineBreak);
    assert_eq!(state.source, "1. one\n2. \n3. two\n4. three");
    assert_eq!(state.selection, Selection::caret(10));
}

#[test]
fn selection_toggle_wraps_and_unwraps() {
    let rt = rt();
    let state = rt.create_state("plain", Some(Selection::range(0, 5)));
    let bolded = rt.apply(&state, &EditCommand::ToggleInline("strong".into()));
    assert_eq!(bolded.source, "**plain**");
    assert_eq!((bolded.selection.start, bolded.selection.end), (0, 5));
    let back = rt.apply(&bolded, &EditCommand::ToggleInline("strong".into()));
    assert_eq!(back.source, "plain");
}

#[test]
fn partial_selection_toggle_splits_the_run() {
    let rt = rt();
    let state = rt.create_state("abcd", Some(Selection::range(1, 3)));
    let state = rt.apply(&state, &EditCommand::ToggleInline("em".into()));
    assert_eq!(state.source, "a*bc*d");
    assert_eq!(state.map.cursor_len(), 4);
}

#[test]
fn pending_mark_applies_to_the_next_insertion() {
    let rt = rt();
    let state = rt.create_state("ab", Some(Selection::caret(1)));
    let armed = rt.apply(&state, &EditCommand::ToggleInline("strong".into()));
    assert_eq!(armed.pending_marks, vec!["strong".to_string()]);
    assert_eq!(armed.source, "ab");
    let typed = rt.apply(&armed, &EditCommand::Insert("x".into()));
    assert_eq!(typed.source, "a**x**b");
    assert_eq!(typed.selection.start, 2);
    assert!(typed.pending_marks.is_empty());
}

#[test]
fn pending_mark_toggled_twice_restores_the_state() {
    let rt = rt();
    let state = rt.create_state("ab", Some(Selection::caret(1)));
    let armed = rt.apply(&state, &EditCommand::ToggleInline("strong".into()));
    let disarmed = rt.apply(&armed, &EditCommand::ToggleInline("strong".into()));
    assert_eq!(disarmed, state);
}

#[test]
fn typing_with_pending_mark_inside_bold_exits_the_run() {
    let rt = rt();
    let state = rt.create_state(
        "**ab**",
        Some(Selection::caret_with_affinity(2, Affinity::Backward)),
    );
    let armed = rt.apply(&state, &EditCommand::ToggleInline("strong".into()));
    let typed = rt.apply(&armed, &EditCommand::Insert("x".into()));
    assert_eq!(typed.source, "**ab**x");
    assert_eq!(typed.selection.start, 3);
}

#[test]
fn deleting_an_image_removes_the_whole_atom() {
    let rt = rt();
    let state = rt.create_state("![cat](cat.png)", Some(Selection::caret(0)));
    assert_eq!(state.map.cursor_len(), 1);
    let state = rt.apply(&state, &EditCommand::DeleteForward);
    assert_eq!(state.source, "");
    assert_eq!(state.selection, Selection::caret(0));
}

#[test]
fn deleting_bold_content_takes_the_markers_along() {
    let rt = rt();
    let state = rt.create_state("x**b**", Some(Selection::caret(2)));
    let state = rt.apply(&state, &EditCommand::DeleteBackward);
    assert_eq!(state.source, "x");
    assert_eq!(state.selection, Selection::caret(1));
}

#[test]
fn backspace_at_paragraph_start_joins_blocks() {
    let rt = rt();
    let state = rt.create_state("one\ntwo", Some(Selection::caret(4)));
    let state = rt.apply(&state, &EditCommand::DeleteBackward);
    assert_eq!(state.source, "onetwo");
    assert_eq!(state.selection, Selection::caret(3));
}

#[test]
fn pasting_a_url_creates_a_link() {
    let rt = rt();
    let state = rt.create_state("see ", Some(Selection::caret(4)));
    let state = rt.apply(
        &state,
        &EditCommand::Paste("https://example.com".into()),
    );
    assert_eq!(state.source, "see [https://example.com](https://example.com)");
}

#[test]
fn pasting_plain_text_inserts_it_verbatim() {
    let rt = rt();
    let state = rt.create_state("ab", Some(Selection::caret(1)));
    let state = rt.apply(&state, &EditCommand::Paste("XY".into()));
    assert_eq!(state.source, "aXYb");
    assert_eq!(state.selection.start, 3);
}

#[test]
fn replacing_a_selection_by_typing() {
    let rt = rt();
    let state = rt.create_state("abcd", Some(Selection::range(1, 3)));
    let state = rt.apply(&state, &EditCommand::Insert("X".into()));
    assert_eq!(state.source, "aXd");
    assert_eq!(state.selection.start, 2);
}

#[test]
fn keybindings_resolve_to_commands() {
    let rt = rt();
    assert_eq!(
        rt.command_for_key("Mod-b"),
        Some(EditCommand::ToggleInline("strong".into()))
    );
    assert_eq!(rt.command_for_key("Enter"), Some(EditCommand::InsertLineBreak));
    assert_eq!(rt.command_for_key("Tab"), Some(EditCommand::Indent));
    assert_eq!(rt.command_for_key("Mod-z"), None);
}

#[test]
fn unknown_toggle_kind_is_a_noop() {
    let rt = rt();
    let state = rt.create_state("ab", Some(Selection::range(0, 2)));
    let next = rt.apply(&state, &EditCommand::ToggleInline("sparkle".into()));
    assert_eq!(next, state);
}

#[test]
fn unknown_extension_command_is_a_noop() {
    let rt = rt();
    let state = rt.create_state("ab", None);
    let next = rt.apply(&state, &EditCommand::Extension("vanish".into()));
    assert_eq!(next, state);
}

#[test]
fn invalid_utf8_is_the_only_error() -> anyhow::Result<()> {
    let rt = rt();
    let err = rt.create_state_from_bytes(b"ok \xf0\x28", None);
    assert!(matches!(err, Err(EngineError::NonUtf8Document(_))));
    let state = rt.create_state_from_bytes("直feld".as_bytes(), None)?;
    assert_eq!(state.source, "直feld");
    Ok(())
}

#[test]
fn stale_selection_offsets_clamp() {
    let rt = rt();
    let state = rt.create_state("ab", Some(Selection::range(40, 90)));
    assert_eq!(state.selection, Selection::range(2, 2));
}
