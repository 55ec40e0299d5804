//! Lists: `- ` bullets and `1. ` ordered items, nested by indentation.
//!
//! Every item is its own wrapper block; a "list" is nothing but a run of
//! adjacent item siblings. Ordered numbers are never stored in the tree:
//! the serializer derives each from the count of consecutive ordered
//! siblings before it, so inserting or deleting an item renumbers the rest
//! on the next pipeline pass.
//!
//! An item's continuation lines are the following lines indented one unit
//! deeper. Parsing dedents them and recurses, which is where nesting comes
//! from; serialization re-indents by absolute depth so every line carries
//! its full indentation.
//!
//! The edit middleware owns three commands inside an item: line break
//! (new sibling item, or list exit on an empty item), indent (adopt by the
//! previous sibling item) and outdent (return to the parent's level, or
//! demote a top-level item to plain content).

use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use prosemark_engine::{
    Affinity, Block, BlockMatch, CursorSourceBuilder, EditCommand, EditCx, EditOutcome,
    EditorState, Extension, NodeLayout, ParseCx, Selection, SerializeCx, Serialized, Teardown,
    segment,
};

use crate::kind;

static ORDERED_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\. ").expect("static pattern"));

pub fn extension() -> Extension {
    Box::new(|host| {
        let registrations = vec![
            host.register_parse_block(Box::new(parse)),
            host.register_serialize_block(Box::new(serialize)),
            host.register_on_edit(Box::new(on_edit)),
            host.register_keybinding("Tab", EditCommand::Indent),
            host.register_keybinding("Shift-Tab", EditCommand::Outdent),
        ];
        Some(Teardown::new(registrations))
    })
}

fn is_item_kind(kind: &str) -> bool {
    kind == kind::BULLET_ITEM || kind == kind::ORDERED_ITEM
}

fn is_item(block: &Block) -> bool {
    matches!(block, Block::Wrapper { kind, .. } if is_item_kind(kind))
}

/// Marker at the start of a line, if any: the item kind and marker length.
fn item_marker(line: &str) -> Option<(&'static str, usize)> {
    if line.starts_with("- ") || line.starts_with("* ") || line.starts_with("+ ") {
        return Some((kind::BULLET_ITEM, 2));
    }
    ORDERED_MARKER
        .find(line)
        .map(|m| (kind::ORDERED_ITEM, m.end()))
}

fn parse(source: &str, cx: &ParseCx<'_>) -> Option<BlockMatch> {
    let line_end = source.find('\n').unwrap_or(source.len());
    let line = &source[..line_end];
    let (item_kind, marker_len) = item_marker(line)?;
    let head = &line[marker_len..];

    // Following lines indented one unit deeper continue this item.
    let unit = cx.config().indent.unit();
    let mut consumed = line_end;
    let mut continuation = String::new();
    let mut rest = &source[line_end..];
    while let Some(after) = rest.strip_prefix('\n') {
        let next_end = after.find('\n').unwrap_or(after.len());
        let Some(dedented) = after[..next_end].strip_prefix(unit.as_str()) else {
            break;
        };
        if !continuation.is_empty() {
            continuation.push('\n');
        }
        continuation.push_str(dedented);
        consumed += 1 + next_end;
        rest = &after[next_end..];
    }

    let mut blocks = vec![Block::paragraph(cx.parse_inlines(head))];
    if !continuation.is_empty() {
        blocks.extend(cx.parse_blocks(&continuation));
    }
    Some(BlockMatch {
        block: Block::wrapper(item_kind, blocks),
        consumed,
    })
}

/// Number of this ordered item within its run of consecutive ordered
/// siblings.
fn ordinal(cx: &SerializeCx<'_>) -> usize {
    let mut n = 1;
    let mut i = cx.index;
    while i > 0 && matches!(&cx.siblings[i - 1], Block::Wrapper { kind, .. } if kind == kind::ORDERED_ITEM)
    {
        n += 1;
        i -= 1;
    }
    n
}

fn serialize(block: &Block, cx: &SerializeCx<'_>) -> Option<Serialized> {
    let Block::Wrapper { kind, blocks } = block else {
        return None;
    };
    let prefix = match kind.as_str() {
        k if k == kind::BULLET_ITEM => "- ".to_string(),
        k if k == kind::ORDERED_ITEM => format!("{}. ", ordinal(cx)),
        _ => return None,
    };
    let child_indent = cx.config().indent.unit().repeat(cx.depth() + 1);
    let mut builder = CursorSourceBuilder::new();
    builder.append_text(&prefix);
    for index in 0..blocks.len() {
        if index > 0 {
            builder.append_text("\n");
            builder.append_text(&child_indent);
        }
        builder.append_serialized(cx.serialize_child_indented(blocks, index));
    }
    Some(builder.build())
}

fn on_edit(
    command: &EditCommand,
    state: &EditorState,
    cx: &EditCx<'_>,
) -> Option<EditOutcome> {
    if !state.selection.is_caret() {
        return None;
    }
    match command {
        EditCommand::InsertLineBreak => line_break(state, cx),
        EditCommand::Indent => indent(state, cx),
        EditCommand::Outdent => outdent(state, cx),
        _ => None,
    }
}

/// The deepest list item whose layout contains the caret, with its sibling
/// slice and index.
fn locate_item<'a>(
    blocks: &'a [Block],
    nodes: &'a [NodeLayout],
    caret: usize,
) -> Option<(&'a [Block], usize, &'a NodeLayout)> {
    let index = nodes
        .iter()
        .position(|n| n.cursor_range.start <= caret && caret <= n.cursor_range.end)?;
    let block = blocks.get(index)?;
    let Block::Wrapper {
        kind,
        blocks: children,
    } = block
    else {
        return None;
    };
    if let Some(found) = locate_item(children, &nodes[index].children, caret) {
        return Some(found);
    }
    if is_item_kind(kind) {
        return Some((blocks, index, &nodes[index]));
    }
    None
}

fn item_depth(state: &EditorState, caret: usize) -> usize {
    state
        .block_path_at(caret)
        .iter()
        .filter(|(block, _)| is_item(block))
        .count()
}

fn line_break(state: &EditorState, cx: &EditCx<'_>) -> Option<EditOutcome> {
    let caret = state.selection.start;
    let (siblings, index, node) = locate_item(&state.doc.blocks, &state.layout, caret)?;
    let Block::Wrapper { kind, blocks } = &siblings[index] else {
        return None;
    };

    // Breaking an empty item exits the list: the prefix goes away and the
    // empty line survives as a paragraph.
    let empty = matches!(
        blocks.as_slice(),
        [Block::Paragraph { content }] if content.is_empty()
    );
    if empty {
        let prefix_end = node
            .children
            .first()
            .map(|child| child.source_range.start)
            .unwrap_or(node.source_range.end);
        let mut source = state.source.clone();
        source.replace_range(node.source_range.start..prefix_end, "");
        trace!("line break on empty item exits the list");
        return Some(EditOutcome {
            source,
            selection: Selection::caret(node.cursor_range.start),
        });
    }

    let marker = if kind == kind::ORDERED_ITEM { "1. " } else { "- " };
    let line_indent = cx.config().indent.unit().repeat(item_depth(state, caret) - 1);
    let inserted = format!("\n{line_indent}{marker}");
    let at = state.map.cursor_to_source(caret, Affinity::Forward);
    let mut source = state.source.clone();
    source.insert_str(at, &inserted);
    let caret = caret + segment::grapheme_count(&inserted);
    Some(EditOutcome {
        source,
        selection: Selection::caret(caret),
    })
}

fn indent(state: &EditorState, cx: &EditCx<'_>) -> Option<EditOutcome> {
    let caret = state.selection.start;
    let (siblings, index, node) = locate_item(&state.doc.blocks, &state.layout, caret)?;
    // Only an item with an item directly above can move under it.
    if index == 0 || !is_item(&siblings[index - 1]) {
        return None;
    }
    let unit = cx.config().indent.unit();
    let span = node.source_range.clone();
    let mut at: Vec<usize> = vec![span.start];
    at.extend(
        state.source[span.clone()]
            .match_indices('\n')
            .map(|(i, _)| span.start + i + 1),
    );
    let mut source = state.source.clone();
    for position in at.iter().rev() {
        source.insert_str(*position, &unit);
    }
    let caret = caret + segment::grapheme_count(&unit);
    Some(EditOutcome {
        source,
        selection: Selection::caret(caret),
    })
}

fn outdent(state: &EditorState, cx: &EditCx<'_>) -> Option<EditOutcome> {
    let caret = state.selection.start;
    let (_, _, node) = locate_item(&state.doc.blocks, &state.layout, caret)?;
    let unit = cx.config().indent.unit();
    let span = node.source_range.clone();
    if item_depth(state, caret) < 2 {
        // No parent level to return to: demote the item to plain content.
        // Nested children dedent one unit and become top-level items.
        let prefix_end = node
            .children
            .first()
            .map(|child| child.source_range.start)
            .unwrap_or(span.end);
        let line_starts: Vec<usize> = state.source[span.clone()]
            .match_indices('\n')
            .map(|(i, _)| span.start + i + 1)
            .collect();
        let mut source = state.source.clone();
        for start in line_starts.iter().rev() {
            if source[*start..].starts_with(unit.as_str()) {
                source.replace_range(*start..*start + unit.len(), "");
            }
        }
        source.replace_range(span.start..prefix_end, "");
        let prefix_width = node
            .children
            .first()
            .map(|child| child.cursor_range.start - node.cursor_range.start)
            .unwrap_or(0);
        let caret = caret
            .saturating_sub(prefix_width)
            .max(node.cursor_range.start);
        return Some(EditOutcome {
            source,
            selection: Selection::caret(caret),
        });
    }
    // The item's own lines each carry one unit from the parent's indent;
    // strip it from the line starts, last line first.
    let mut starts: Vec<usize> = vec![span.start];
    starts.extend(
        state.source[span.clone()]
            .match_indices('\n')
            .map(|(i, _)| span.start + i + 1),
    );
    let mut source = state.source.clone();
    for start in starts.iter().rev() {
        let before = *start;
        // Only the item's first line has its indent before the span start;
        // continuation starts follow a newline, where slicing backwards
        // could land mid-grapheme.
        if before >= unit.len()
            && source.is_char_boundary(before - unit.len())
            && source[before - unit.len()..before] == unit
        {
            source.replace_range(before - unit.len()..before, "");
        } else if source[before..].starts_with(unit.as_str()) {
            source.replace_range(before..before + unit.len(), "");
        }
    }
    let caret = caret.saturating_sub(segment::grapheme_count(&unit));
    Some(EditOutcome {
        source,
        selection: Selection::caret(caret),
    })
}
