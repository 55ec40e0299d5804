//! Structure-aware range deletion.
//!
//! Deletion works in cursor space against the layout tree, then projects the
//! surviving slots back to source bytes through the map. The base rule is
//! plain: drop the source bytes of every slot in the range, keep all marker
//! gaps, reparse. Three structural adjustments sit on top:
//!
//! - **Prefix demotion.** The visible slots between a wrapper block's start
//!   and its first child are its prefix (`- `, `# `, `> `). Deleting into a
//!   prefix removes the whole prefix, demoting the block, and parks the
//!   caret where the prefix began.
//! - **Separator widening.** Slots between sibling blocks (the inter-block
//!   newline, plus continuation prefixes like `\n> `) form one logical
//!   separator; deleting any of it deletes all of it, merging the
//!   neighbors. A merged-in wrapper sheds its own prefix too.
//! - **Atom isolation.** A separator next to a surviving block atom is kept;
//!   atoms never merge with neighboring text. Atoms themselves are single
//!   slots and vanish whole.
//! - **Marker cleanup.** A node whose visible content is entirely deleted
//!   is dropped with its full source span, so no orphaned marker pair
//!   survives the reparse.

use std::ops::Range;

use crate::edit::EditOutcome;
use crate::model::Block;
use crate::runtime::EditorState;
use crate::sourcemap::{NodeLayout, Selection};

pub(crate) fn delete_range(state: &EditorState, range: Range<usize>) -> EditOutcome {
    let len = state.map.cursor_len();
    let range = range.start.min(len)..range.end.min(len);
    if range.start >= range.end {
        return EditOutcome {
            source: state.source.clone(),
            selection: Selection::caret(range.start),
        };
    }

    let mut deleted = vec![false; len];
    for slot in range.clone() {
        deleted[slot] = true;
    }
    let mut caret_target = range.start;
    adjust_level(
        &state.doc.blocks,
        &state.layout,
        0..len,
        &mut deleted,
        &mut caret_target,
    );

    // Source ranges to drop: the bytes of every deleted slot, plus the full
    // span (markers included) of every node whose slots are all deleted, so
    // emptied wrappers take their marker pairs with them.
    let boundaries = state.map.boundaries();
    let mut drops: Vec<Range<usize>> = (0..len)
        .filter(|&slot| deleted[slot])
        .map(|slot| boundaries[slot].source_forward..boundaries[slot + 1].source_backward)
        .collect();
    collect_emptied_nodes(&state.layout, &deleted, &mut drops);
    drops.sort_by_key(|r| r.start);

    let mut source = String::with_capacity(state.source.len());
    let mut pos = 0;
    for span in drops {
        if span.start > pos {
            source.push_str(&state.source[pos..span.start]);
        }
        pos = pos.max(span.end);
    }
    source.push_str(&state.source[pos..]);

    let caret = (0..caret_target).filter(|&slot| !deleted[slot]).count();
    EditOutcome {
        source,
        selection: Selection::caret(caret),
    }
}

fn collect_emptied_nodes(nodes: &[NodeLayout], deleted: &[bool], drops: &mut Vec<Range<usize>>) {
    for node in nodes {
        let slots = node.cursor_range.clone();
        if !slots.is_empty() && slots.clone().all(|slot| deleted[slot]) {
            drops.push(node.source_range.clone());
        } else {
            collect_emptied_nodes(&node.children, deleted, drops);
        }
    }
}

/// Apply the structural rules to one sibling list, then recurse into
/// wrappers. `span` is the parent's cursor range; slots in `span` covered by
/// no sibling are prefix (before the first sibling) or separators.
fn adjust_level(
    blocks: &[Block],
    nodes: &[NodeLayout],
    span: Range<usize>,
    deleted: &mut [bool],
    caret_target: &mut usize,
) {
    let mut cursor = span.start;
    for (index, node) in nodes.iter().enumerate() {
        if cursor < node.cursor_range.start {
            let gap = cursor..node.cursor_range.start;
            if index == 0 {
                demote_prefix(gap, deleted, caret_target);
            } else {
                let left = neighbor(blocks, nodes, index - 1);
                let right = neighbor(blocks, nodes, index);
                merge_separator(gap, left, right, deleted);
            }
        }
        cursor = node.cursor_range.end;
    }
    if cursor < span.end {
        let left = nodes
            .len()
            .checked_sub(1)
            .and_then(|last| neighbor(blocks, nodes, last));
        merge_separator(cursor..span.end, left, None, deleted);
    }

    for (block, node) in blocks.iter().zip(nodes) {
        if let Block::Wrapper {
            blocks: children, ..
        } = block
        {
            adjust_level(
                children,
                &node.children,
                node.cursor_range.clone(),
                deleted,
                caret_target,
            );
        }
    }
}

fn neighbor<'a>(
    blocks: &'a [Block],
    nodes: &'a [NodeLayout],
    index: usize,
) -> Option<(&'a Block, &'a NodeLayout)> {
    Some((blocks.get(index)?, nodes.get(index)?))
}

fn demote_prefix(prefix: Range<usize>, deleted: &mut [bool], caret_target: &mut usize) {
    if !prefix.clone().any(|slot| deleted[slot]) {
        return;
    }
    *caret_target = (*caret_target).min(prefix.start);
    for slot in prefix {
        deleted[slot] = true;
    }
}

fn merge_separator(
    gap: Range<usize>,
    left: Option<(&Block, &NodeLayout)>,
    right: Option<(&Block, &NodeLayout)>,
    deleted: &mut [bool],
) {
    if !gap.clone().any(|slot| deleted[slot]) {
        return;
    }
    // A surviving atom keeps its separator: merging would dissolve the
    // atom's source into the neighboring text on reparse.
    let shields = |end: Option<(&Block, &NodeLayout)>| {
        end.is_some_and(|(block, node)| {
            matches!(block, Block::Atom { .. })
                && node.cursor_range.clone().any(|slot| !deleted[slot])
        })
    };
    if shields(left) || shields(right) {
        for slot in gap {
            deleted[slot] = false;
        }
        return;
    }
    for slot in gap {
        deleted[slot] = true;
    }
    // The right neighbor merges leftward; if it is prefixed markup, the
    // prefix goes with the separator.
    if let Some((Block::Wrapper { .. }, node)) = right
        && let Some(first_child) = node.children.first()
        && node.cursor_range.start < first_child.cursor_range.start
    {
        for slot in node.cursor_range.start..first_child.cursor_range.start {
            deleted[slot] = true;
        }
    }
}
