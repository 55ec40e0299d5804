//! Grapheme and word segmentation.
//!
//! The cursor model counts user-perceived units: one grapheme cluster (or one
//! atom) per cursor slot. This module is the only place the engine touches
//! Unicode segmentation, and it is used solely for cursor granularity, never
//! to parse syntax. No normalization is applied: the engine must round-trip
//! the source byte-for-byte.

use std::ops::Range;

use unicode_segmentation::UnicodeSegmentation;

/// Iterate the extended grapheme clusters of `text`.
pub fn graphemes(text: &str) -> impl Iterator<Item = &str> {
    text.graphemes(true)
}

/// Number of user-perceived units in `text`.
pub fn grapheme_count(text: &str) -> usize {
    text.graphemes(true).count()
}

/// Word-boundary segments as byte ranges, whitespace runs included.
///
/// Front-ends use this for word motions and double-click selection; the
/// engine itself only needs grapheme granularity.
pub fn word_ranges(text: &str) -> Vec<Range<usize>> {
    let mut out = Vec::new();
    let mut pos = 0;
    for word in text.split_word_bounds() {
        out.push(pos..pos + word.len());
        pos += word.len();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combining_mark_is_one_unit() {
        // e + combining acute is a single perceived character
        assert_eq!(grapheme_count("e\u{0301}b"), 2);
    }

    #[test]
    fn zwj_emoji_is_one_unit() {
        let family = "👨\u{200d}👩\u{200d}👧";
        assert_eq!(grapheme_count(family), 1);
    }

    #[test]
    fn grapheme_slices_tile_the_text() {
        let text = "a漢b";
        let rebuilt: String = graphemes(text).collect();
        assert_eq!(rebuilt, text);
        assert_eq!(grapheme_count(text), 3);
    }

    #[test]
    fn word_ranges_tile_the_text() {
        let text = "one two,three";
        let ranges = word_ranges(text);
        let rebuilt: String = ranges.iter().map(|r| &text[r.clone()]).collect();
        assert_eq!(rebuilt, text);
        assert_eq!(&text[ranges[0].clone()], "one");
        assert_eq!(&text[ranges[1].clone()], " ");
    }

    #[test]
    fn empty_text() {
        assert_eq!(grapheme_count(""), 0);
        assert!(word_ranges("").is_empty());
    }
}
