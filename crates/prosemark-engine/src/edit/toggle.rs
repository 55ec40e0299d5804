//! Inline styling: toggling wrapper kinds over a selection and applying
//! pending marks to insertions.
//!
//! Both operations share one representation: a paragraph's inline content
//! flattened into per-slot segments, each a leaf (one grapheme or one atom)
//! tagged with its stack of enclosing wrapper kinds. Toggling edits the
//! stacks; rebuilding groups equal stack prefixes back into minimally
//! nested wrappers. Marker syntax never appears here, so the same code
//! serves every registered toggleable kind.

use std::ops::Range;

use crate::model::{Block, Inline, NodeData};
use crate::runtime::host::{CaretPlacement, Registry};
use crate::runtime::{EditorState, Runtime};
use crate::segment;
use crate::sourcemap::{Affinity, NodeLayout, Selection};

/// One cursor slot of a paragraph with its enclosing wrapper kinds,
/// outermost first.
#[derive(Debug, Clone)]
struct Segment {
    leaf: Leaf,
    stack: Vec<(String, NodeData)>,
}

#[derive(Debug, Clone)]
enum Leaf {
    Grapheme(String),
    Atom { kind: String, data: NodeData },
}

pub(crate) fn toggle_inline(runtime: &Runtime, state: &EditorState, kind: &str) -> EditorState {
    if runtime.registry().toggle_marker_for_kind(kind).is_none() {
        return state.clone();
    }
    if state.selection.is_caret() {
        // Arm (or disarm) the mark for the next insertion.
        let mut next = state.clone();
        if let Some(at) = next.pending_marks.iter().position(|k| k == kind) {
            next.pending_marks.remove(at);
        } else {
            next.pending_marks.push(kind.to_string());
        }
        return next;
    }

    let range = state.selection.start..state.selection.end;
    let Some((path, start)) = locate_paragraph(&state.doc.blocks, &state.layout, range.clone())
    else {
        return state.clone();
    };
    let mut doc = state.doc.clone();
    let Some(content) = paragraph_mut(&mut doc.blocks, &path) else {
        return state.clone();
    };
    let mut segments = flatten(content);
    let local = range.start - start..range.end - start;

    let covered = segments[local.clone()]
        .iter()
        .all(|s| s.stack.iter().any(|(k, _)| k == kind));
    for segment in &mut segments[local] {
        if covered {
            segment.stack.retain(|(k, _)| k != kind);
        } else if !segment.stack.iter().any(|(k, _)| k == kind) {
            segment.stack.push((kind.to_string(), NodeData::new()));
        }
    }
    *content = rebuild(&segments, 0);

    let serialized = runtime.serialize(&doc);
    runtime.create_state(&serialized.source, Some(state.selection))
}

/// Insert `text` at the caret with the state's pending marks applied,
/// flipping each mark against the wrapper stack already active there.
/// Declines when the caret is not inside a paragraph.
pub(crate) fn insert_with_marks(
    runtime: &Runtime,
    state: &EditorState,
    text: &str,
) -> Option<EditorState> {
    let caret = state.selection.start;
    let (path, start) = locate_paragraph(&state.doc.blocks, &state.layout, caret..caret)?;
    let mut doc = state.doc.clone();
    let content = paragraph_mut(&mut doc.blocks, &path)?;
    let mut segments = flatten(content);
    let local = caret - start;

    let mut stack = stack_at(&segments, local, state.selection.affinity, runtime.registry());
    for kind in &state.pending_marks {
        if let Some(at) = stack.iter().position(|(k, _)| k == kind) {
            stack.remove(at);
        } else {
            stack.push((kind.clone(), NodeData::new()));
        }
    }

    let inserted: Vec<Segment> = segment::graphemes(text)
        .map(|g| Segment {
            leaf: Leaf::Grapheme(g.to_string()),
            stack: stack.clone(),
        })
        .collect();
    let width = inserted.len();
    segments.splice(local..local, inserted);
    *content = rebuild(&segments, 0);

    let serialized = runtime.serialize(&doc);
    Some(runtime.create_state(
        &serialized.source,
        Some(Selection::caret_with_affinity(caret + width, Affinity::Backward)),
    ))
}

/// The wrapper stack active at a caret position between segments. A wrapper
/// both sides share is unconditionally active; a wrapper only one side has
/// is active when the caret leans into it and the kind's declared placement
/// keeps edge carets inside.
fn stack_at(
    segments: &[Segment],
    at: usize,
    affinity: Affinity,
    registry: &Registry,
) -> Vec<(String, NodeData)> {
    let left = at.checked_sub(1).map(|i| &segments[i].stack);
    let right = segments.get(at).map(|s| &s.stack);
    let (anchor, other) = match affinity {
        Affinity::Backward => (left.or(right), right),
        Affinity::Forward => (right.or(left), left),
    };
    let Some(anchor) = anchor else {
        return Vec::new();
    };
    anchor
        .iter()
        .filter(|(kind, _)| {
            other.is_some_and(|stack| stack.iter().any(|(k, _)| k == kind))
                || registry.placement_for_kind(kind) == CaretPlacement::Inside
        })
        .cloned()
        .collect()
}

fn flatten(inlines: &[Inline]) -> Vec<Segment> {
    let mut out = Vec::new();
    let mut stack = Vec::new();
    flatten_into(inlines, &mut stack, &mut out);
    out
}

fn flatten_into(inlines: &[Inline], stack: &mut Vec<(String, NodeData)>, out: &mut Vec<Segment>) {
    for inline in inlines {
        match inline {
            Inline::Text { text } => {
                for grapheme in segment::graphemes(text) {
                    out.push(Segment {
                        leaf: Leaf::Grapheme(grapheme.to_string()),
                        stack: stack.clone(),
                    });
                }
            }
            Inline::Wrapper {
                kind,
                children,
                data,
            } => {
                stack.push((kind.clone(), data.clone()));
                flatten_into(children, stack, out);
                stack.pop();
            }
            Inline::Atom { kind, data } => out.push(Segment {
                leaf: Leaf::Atom {
                    kind: kind.clone(),
                    data: data.clone(),
                },
                stack: stack.clone(),
            }),
        }
    }
}

/// Regroup segments into inline nodes, nesting by shared stack prefixes.
fn rebuild(segments: &[Segment], depth: usize) -> Vec<Inline> {
    let mut out: Vec<Inline> = Vec::new();
    let mut i = 0;
    while i < segments.len() {
        let stack = &segments[i].stack;
        if stack.len() == depth {
            match &segments[i].leaf {
                Leaf::Grapheme(g) => {
                    if let Some(Inline::Text { text }) = out.last_mut() {
                        text.push_str(g);
                    } else {
                        out.push(Inline::text(g.clone()));
                    }
                }
                Leaf::Atom { kind, data } => out.push(Inline::atom(kind.clone(), data.clone())),
            }
            i += 1;
        } else {
            let entry = &stack[depth];
            let mut j = i;
            while j < segments.len()
                && segments[j].stack.len() > depth
                && segments[j].stack[depth] == *entry
            {
                j += 1;
            }
            out.push(Inline::wrapper_with_data(
                entry.0.clone(),
                rebuild(&segments[i..j], depth + 1),
                entry.1.clone(),
            ));
            i = j;
        }
    }
    out
}

/// Find the paragraph whose cursor range contains `range`, returning the
/// index path to it and its cursor-space start. `None` when the range spans
/// blocks or lands on an atom.
fn locate_paragraph(
    blocks: &[Block],
    nodes: &[NodeLayout],
    range: Range<usize>,
) -> Option<(Vec<usize>, usize)> {
    for (index, (block, node)) in blocks.iter().zip(nodes).enumerate() {
        if range.start < node.cursor_range.start || range.end > node.cursor_range.end {
            continue;
        }
        match block {
            Block::Paragraph { .. } => return Some((vec![index], node.cursor_range.start)),
            Block::Wrapper {
                blocks: children, ..
            } => {
                let (mut path, start) = locate_paragraph(children, &node.children, range)?;
                path.insert(0, index);
                return Some((path, start));
            }
            Block::Atom { .. } => return None,
        }
    }
    None
}

fn paragraph_mut<'a>(blocks: &'a mut [Block], path: &[usize]) -> Option<&'a mut Vec<Inline>> {
    let (&index, rest) = path.split_first()?;
    match blocks.get_mut(index)? {
        Block::Paragraph { content } if rest.is_empty() => Some(content),
        Block::Wrapper {
            blocks: children, ..
        } if !rest.is_empty() => paragraph_mut(children, rest),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn flatten_then_rebuild_is_identity_for_merged_trees() {
        let content = vec![
            Inline::text("a"),
            Inline::wrapper("strong", vec![Inline::text("bc")]),
            Inline::atom("mention", NodeData::from([("handle".into(), "x".into())])),
        ];
        let rebuilt = rebuild(&flatten(&content), 0);
        assert_eq!(rebuilt, content);
    }

    #[test]
    fn rebuild_groups_shared_stacks_minimally() {
        let segments = flatten(&[
            Inline::wrapper("strong", vec![Inline::text("a")]),
            Inline::wrapper("strong", vec![Inline::text("b")]),
        ]);
        let rebuilt = rebuild(&segments, 0);
        assert_eq!(
            rebuilt,
            vec![Inline::wrapper("strong", vec![Inline::text("ab")])]
        );
    }

    #[test]
    fn rebuild_preserves_wrapper_data() {
        let mut data = NodeData::new();
        data.insert("url".into(), "https://example.com".into());
        let content = vec![Inline::wrapper_with_data(
            "link",
            vec![Inline::text("go")],
            data.clone(),
        )];
        assert_eq!(rebuild(&flatten(&content), 0), content);
    }

    #[test]
    fn stack_at_respects_shared_wrappers() {
        let segments = flatten(&[Inline::wrapper("strong", vec![Inline::text("ab")])]);
        let registry = Registry::default();
        // Strictly inside the run: active regardless of placement.
        let stack = stack_at(&segments, 1, Affinity::Backward, &registry);
        assert_eq!(stack.len(), 1);
        assert_eq!(stack[0].0, "strong");
        // At the very end with default Outside placement: inactive.
        let stack = stack_at(&segments, 2, Affinity::Backward, &registry);
        assert!(stack.is_empty());
    }
}
