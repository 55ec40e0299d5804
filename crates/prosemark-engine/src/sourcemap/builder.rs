//! Incremental construction of source text and cursor-source map.
//!
//! Serializers build their output through a [`CursorSourceBuilder`] threaded
//! through the recursive serialize calls: syntax markers advance only the
//! source cursor, visible text advances both, and child fragments built by
//! nested serializers are spliced in with their offsets shifted.

use std::ops::Range;

use crate::segment;
use crate::sourcemap::{Boundary, CursorSourceMap};

/// Cursor-space extent of one serialized node, with its children.
///
/// Recorded by the serialize pipeline as rules splice child fragments; the
/// edit engine walks this instead of re-deriving node widths from extension
/// knowledge. Gaps before the first child (a block prefix like `- `) or
/// between siblings (inter-block newlines) belong to the parent.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeLayout {
    pub cursor_range: Range<usize>,
    /// The node's full source span, markers included.
    pub source_range: Range<usize>,
    pub children: Vec<NodeLayout>,
}

impl NodeLayout {
    fn shift(&mut self, cursor_by: usize, source_by: usize) {
        self.cursor_range = self.cursor_range.start + cursor_by..self.cursor_range.end + cursor_by;
        self.source_range = self.source_range.start + source_by..self.source_range.end + source_by;
        for child in &mut self.children {
            child.shift(cursor_by, source_by);
        }
    }
}

/// Layouts of a document's top-level blocks, in order.
pub type Layout = Vec<NodeLayout>;

/// Result of serializing a document or a fragment of one.
#[derive(Debug, Clone, PartialEq)]
pub struct Serialized {
    pub source: String,
    pub map: CursorSourceMap,
    pub layout: Layout,
}

impl Serialized {
    /// Wrap this fragment's layout into a single node covering the whole
    /// fragment, keeping the spliced child layouts underneath. Called by the
    /// pipeline once per serialized node.
    pub(crate) fn into_node(mut self) -> Serialized {
        let node = NodeLayout {
            cursor_range: 0..self.map.cursor_len(),
            source_range: 0..self.source.len(),
            children: std::mem::take(&mut self.layout),
        };
        self.layout = vec![node];
        self
    }
}

/// Builds `(source, map, layout)` incrementally.
///
/// Invariant maintained by every append: the last boundary's forward edge
/// equals the current source length, and both boundary offset sequences are
/// non-decreasing.
#[derive(Debug)]
pub struct CursorSourceBuilder {
    source: String,
    boundaries: Vec<Boundary>,
    cursor_len: usize,
    layout: Layout,
}

impl CursorSourceBuilder {
    pub fn new() -> Self {
        Self {
            source: String::new(),
            boundaries: vec![Boundary {
                source_backward: 0,
                source_forward: 0,
            }],
            cursor_len: 0,
            layout: Vec::new(),
        }
    }

    /// Append pure syntax (`**`, `](url)`): the source advances, no cursor
    /// boundary is created. The marker becomes part of the gap at the current
    /// boundary.
    pub fn append_source_only(&mut self, text: &str) {
        self.source.push_str(text);
        self.boundaries
            .last_mut()
            .expect("builder always holds at least one boundary")
            .source_forward = self.source.len();
    }

    /// Append visible text: one cursor slot per grapheme cluster.
    pub fn append_text(&mut self, text: &str) {
        for grapheme in segment::graphemes(text) {
            self.source.push_str(grapheme);
            self.boundaries.push(Boundary {
                source_backward: self.source.len(),
                source_forward: self.source.len(),
            });
            self.cursor_len += 1;
        }
    }

    /// Append an indivisible unit: the whole `source_text` maps to
    /// `cursor_width` slots (normally one) with no boundary strictly inside
    /// its source span.
    pub fn append_cursor_atom(&mut self, source_text: &str, cursor_width: usize) {
        self.source.push_str(source_text);
        for _ in 0..cursor_width {
            self.boundaries.push(Boundary {
                source_backward: self.source.len(),
                source_forward: self.source.len(),
            });
            self.cursor_len += 1;
        }
    }

    /// Splice a fragment built by a nested serializer, shifting its offsets.
    /// The fragment's leading boundary merges into the current one.
    pub fn append_serialized(&mut self, fragment: Serialized) {
        let source_base = self.source.len();
        let cursor_base = self.cursor_len;

        self.source.push_str(&fragment.source);

        let mut incoming = fragment.map.boundaries().iter();
        if let Some(first) = incoming.next() {
            // A fragment's first boundary always starts at backward 0; its
            // forward edge is any leading markers, which join our gap.
            self.boundaries
                .last_mut()
                .expect("builder always holds at least one boundary")
                .source_forward = source_base + first.source_forward;
        }
        for b in incoming {
            self.boundaries.push(Boundary {
                source_backward: source_base + b.source_backward,
                source_forward: source_base + b.source_forward,
            });
        }
        self.cursor_len += fragment.map.cursor_len();

        for mut node in fragment.layout {
            node.shift(cursor_base, source_base);
            self.layout.push(node);
        }
    }

    /// Current number of cursor slots appended.
    pub fn cursor_len(&self) -> usize {
        self.cursor_len
    }

    pub fn build(self) -> Serialized {
        Serialized {
            map: CursorSourceMap::new(self.boundaries, self.cursor_len),
            source: self.source,
            layout: self.layout,
        }
    }
}

impl Default for CursorSourceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sourcemap::Affinity;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_build() {
        let built = CursorSourceBuilder::new().build();
        assert_eq!(built.source, "");
        assert_eq!(built.map.cursor_len(), 0);
        assert_eq!(built.map.boundaries().len(), 1);
    }

    #[test]
    fn boundary_count_matches_cursor_len() {
        let mut b = CursorSourceBuilder::new();
        b.append_source_only("*");
        b.append_text("abc");
        b.append_cursor_atom("@user", 1);
        let built = b.build();
        assert_eq!(built.map.cursor_len(), 4);
        assert_eq!(built.map.boundaries().len(), 5);
    }

    #[test]
    fn atom_has_no_interior_boundary() {
        let mut b = CursorSourceBuilder::new();
        b.append_text("x");
        b.append_cursor_atom("@user", 1);
        let built = b.build();
        // Boundary 1 sits before the atom, boundary 2 after its full span.
        assert_eq!(built.map.cursor_to_source(1, Affinity::Forward), 1);
        assert_eq!(built.map.cursor_to_source(2, Affinity::Backward), 6);
        for pair in built.map.boundaries().windows(2) {
            assert!(pair[0].source_forward <= pair[1].source_backward);
        }
    }

    #[test]
    fn splice_shifts_offsets_and_merges_leading_gap() {
        // Child fragment: "*b*" with invisible markers.
        let mut child = CursorSourceBuilder::new();
        child.append_source_only("*");
        child.append_text("b");
        child.append_source_only("*");

        let mut parent = CursorSourceBuilder::new();
        parent.append_text("a");
        parent.append_serialized(child.build());
        parent.append_text("c");
        let built = parent.build();

        assert_eq!(built.source, "a*b*c");
        assert_eq!(built.map.cursor_len(), 3);
        // Boundary 1 spans the spliced opening marker.
        assert_eq!(built.map.cursor_to_source(1, Affinity::Backward), 1);
        assert_eq!(built.map.cursor_to_source(1, Affinity::Forward), 2);
        // Boundary 2 spans the closing marker.
        assert_eq!(built.map.cursor_to_source(2, Affinity::Backward), 3);
        assert_eq!(built.map.cursor_to_source(2, Affinity::Forward), 4);
    }

    #[test]
    fn monotonic_boundaries() {
        let mut b = CursorSourceBuilder::new();
        b.append_source_only("**");
        b.append_text("a漢");
        b.append_source_only("**");
        b.append_text("b");
        let built = b.build();
        let bs = built.map.boundaries();
        for pair in bs.windows(2) {
            assert!(pair[0].source_backward <= pair[1].source_backward);
            assert!(pair[0].source_forward <= pair[1].source_forward);
        }
        for boundary in bs {
            assert!(boundary.source_backward <= boundary.source_forward);
        }
    }

    #[test]
    fn layout_splicing_shifts_ranges() {
        let mut child = CursorSourceBuilder::new();
        child.append_text("bb");
        let child = child.build().into_node();

        let mut parent = CursorSourceBuilder::new();
        parent.append_text("a");
        parent.append_serialized(child);
        let built = parent.build();

        assert_eq!(built.layout.len(), 1);
        assert_eq!(built.layout[0].cursor_range, 1..3);
        assert_eq!(built.layout[0].source_range, 1..3);
    }
}
