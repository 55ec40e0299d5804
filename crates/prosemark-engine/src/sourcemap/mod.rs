//! # Cursor-source map
//!
//! Translates between cursor space (what the user perceives: one slot per
//! grapheme cluster or atom, no syntax) and source space (byte offsets in the
//! literal markdown-like string, syntax markers included).
//!
//! A document with `cursor_len` slots has `cursor_len + 1` **boundaries**;
//! boundary `i` is the position between slot `i - 1` and slot `i`. Each
//! boundary records a source interval `[source_backward, source_forward]`:
//! the two offsets differ exactly where source-only markers sit at that
//! cursor position (e.g. the closing `**` after the last letter of a bold
//! run). [`Affinity`] picks a side of such a gap.
//!
//! Maps are built once per serialize pass by [`CursorSourceBuilder`] and are
//! immutable afterwards.

pub mod builder;

pub use builder::{CursorSourceBuilder, Layout, NodeLayout, Serialized};

use serde::Serialize;

/// Which side of a zero-cursor-width source gap a cursor offset refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Affinity {
    Backward,
    Forward,
}

/// One entry of the map: the source interval belonging to a cursor position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Boundary {
    pub source_backward: usize,
    pub source_forward: usize,
}

impl Boundary {
    fn pick(&self, affinity: Affinity) -> usize {
        match affinity {
            Affinity::Backward => self.source_backward,
            Affinity::Forward => self.source_forward,
        }
    }

    /// True if source-only markers sit at this boundary.
    pub fn has_gap(&self) -> bool {
        self.source_backward != self.source_forward
    }
}

/// Bidirectional, affinity-aware mapping between cursor and source offsets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CursorSourceMap {
    boundaries: Vec<Boundary>,
    cursor_len: usize,
}

impl CursorSourceMap {
    pub(crate) fn new(boundaries: Vec<Boundary>, cursor_len: usize) -> Self {
        debug_assert_eq!(boundaries.len(), cursor_len + 1);
        Self {
            boundaries,
            cursor_len,
        }
    }

    /// Number of navigable cursor slots in the document.
    pub fn cursor_len(&self) -> usize {
        self.cursor_len
    }

    pub fn boundaries(&self) -> &[Boundary] {
        &self.boundaries
    }

    /// The boundary at a (clamped) cursor offset.
    pub fn boundary(&self, cursor_offset: usize) -> Boundary {
        self.boundaries[cursor_offset.min(self.cursor_len)]
    }

    /// Source offset for a cursor offset. Out-of-range offsets clamp: stale
    /// positions from input devices are expected, not an error.
    pub fn cursor_to_source(&self, cursor_offset: usize, affinity: Affinity) -> usize {
        self.boundary(cursor_offset).pick(affinity)
    }

    /// Cursor offset (and effective affinity) for a source offset.
    ///
    /// - Offsets between two boundaries' intervals lie inside a multi-byte
    ///   grapheme; `bias` decides which neighboring boundary wins.
    /// - Offsets exactly on a gap edge force the matching affinity.
    /// - Offsets strictly inside a boundary's marker gap belong to that
    ///   boundary no matter the bias; the affinity is derived from the gap's
    ///   own shape (nearest edge, ties forward).
    pub fn source_to_cursor(&self, source_offset: usize, bias: Affinity) -> (usize, Affinity) {
        for (i, b) in self.boundaries.iter().enumerate() {
            if source_offset < b.source_backward {
                // Inside the bytes of grapheme i-1..i; round per bias.
                return match bias {
                    Affinity::Backward => (i.saturating_sub(1), bias),
                    Affinity::Forward => (i, bias),
                };
            }
            if source_offset <= b.source_forward {
                if !b.has_gap() {
                    return (i, bias);
                }
                if source_offset == b.source_backward {
                    return (i, Affinity::Backward);
                }
                if source_offset == b.source_forward {
                    return (i, Affinity::Forward);
                }
                let to_back = source_offset - b.source_backward;
                let to_front = b.source_forward - source_offset;
                let affinity = if to_back < to_front {
                    Affinity::Backward
                } else {
                    Affinity::Forward
                };
                return (i, affinity);
            }
        }
        (self.cursor_len, Affinity::Backward)
    }
}

/// A cursor-space selection. `start <= end` after clamping; `affinity`
/// disambiguates which side of a marker gap a collapsed caret sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
    pub affinity: Affinity,
}

impl Selection {
    pub fn caret(at: usize) -> Self {
        Self {
            start: at,
            end: at,
            affinity: Affinity::Backward,
        }
    }

    pub fn caret_with_affinity(at: usize, affinity: Affinity) -> Self {
        Self {
            start: at,
            end: at,
            affinity,
        }
    }

    pub fn range(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            affinity: Affinity::Backward,
        }
    }

    pub fn is_caret(&self) -> bool {
        self.start == self.end
    }

    /// Clamp into `[0, cursor_len]` and order the endpoints.
    pub fn clamped(mut self, cursor_len: usize) -> Self {
        self.start = self.start.min(cursor_len);
        self.end = self.end.min(cursor_len);
        if self.start > self.end {
            std::mem::swap(&mut self.start, &mut self.end);
        }
        self
    }
}

impl Default for Selection {
    fn default() -> Self {
        Selection::caret(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Map for `**ab**`: markers are source-only, "ab" is visible.
    fn bold_ab() -> CursorSourceMap {
        let mut b = CursorSourceBuilder::new();
        b.append_source_only("**");
        b.append_text("ab");
        b.append_source_only("**");
        let built = b.build();
        assert_eq!(built.source, "**ab**");
        built.map
    }

    #[test]
    fn bold_ab_cursor_len() {
        assert_eq!(bold_ab().cursor_len(), 2);
    }

    #[test]
    fn bold_ab_directed_conversion() {
        let map = bold_ab();
        assert_eq!(map.cursor_to_source(2, Affinity::Forward), 6);
        assert_eq!(map.cursor_to_source(2, Affinity::Backward), 4);
        assert_eq!(map.cursor_to_source(0, Affinity::Backward), 0);
        assert_eq!(map.cursor_to_source(0, Affinity::Forward), 2);
        // No gap between the letters.
        assert_eq!(map.cursor_to_source(1, Affinity::Backward), 3);
        assert_eq!(map.cursor_to_source(1, Affinity::Forward), 3);
    }

    #[test]
    fn cursor_offsets_clamp() {
        let map = bold_ab();
        assert_eq!(map.cursor_to_source(99, Affinity::Forward), 6);
    }

    #[test]
    fn source_to_cursor_on_text() {
        let map = bold_ab();
        assert_eq!(map.source_to_cursor(3, Affinity::Forward), (1, Affinity::Forward));
        assert_eq!(map.source_to_cursor(3, Affinity::Backward), (1, Affinity::Backward));
    }

    #[test]
    fn source_to_cursor_on_gap_edges() {
        let map = bold_ab();
        // Exactly before the closing markers: backward side of boundary 2.
        assert_eq!(map.source_to_cursor(4, Affinity::Forward), (2, Affinity::Backward));
        // Exactly after them: forward side.
        assert_eq!(map.source_to_cursor(6, Affinity::Backward), (2, Affinity::Forward));
    }

    #[test]
    fn source_to_cursor_inside_gap_overrides_bias() {
        let map = bold_ab();
        // Between the two closing asterisks the boundary's own shape decides.
        let (cursor, _) = map.source_to_cursor(5, Affinity::Backward);
        assert_eq!(cursor, 2);
        let (cursor, _) = map.source_to_cursor(5, Affinity::Forward);
        assert_eq!(cursor, 2);
        // Inside the opening markers: still boundary 0.
        let (cursor, affinity) = map.source_to_cursor(1, Affinity::Backward);
        assert_eq!((cursor, affinity), (0, Affinity::Forward));
    }

    #[test]
    fn source_inside_multibyte_grapheme_rounds_per_bias() {
        let mut b = CursorSourceBuilder::new();
        b.append_text("漢a");
        let map = b.build().map;
        // "漢" is 3 bytes; offset 1 is strictly inside it.
        assert_eq!(map.source_to_cursor(1, Affinity::Backward).0, 0);
        assert_eq!(map.source_to_cursor(1, Affinity::Forward).0, 1);
    }

    #[test]
    fn selection_clamps_and_orders() {
        let sel = Selection::range(9, 4).clamped(6);
        assert_eq!((sel.start, sel.end), (4, 6));
    }
}
