//! The parse pipeline: greedy, non-backtracking recursive descent composed
//! from registered rules.
//!
//! Block parsing walks the source left to right, offering the remaining
//! slice to each block rule in registration order and taking the first
//! match. Unmatched lines become paragraphs. Inline parsing works the same
//! way inside a line; unmatched graphemes accumulate into text runs.
//!
//! Parsing never fails: malformed or ambiguous markup simply matches no rule
//! and survives as literal text.

use tracing::trace;

use crate::config::RuntimeConfig;
use crate::model::{Block, Inline};
use crate::runtime::host::Registry;
use crate::segment;

/// Context handed to parse rules; gives them recursive access to the
/// composed grammar for their children.
pub struct ParseCx<'r> {
    pub(crate) registry: &'r Registry,
    pub(crate) config: &'r RuntimeConfig,
}

impl<'r> ParseCx<'r> {
    pub fn config(&self) -> &RuntimeConfig {
        self.config
    }

    /// Parse a sequence of newline-separated blocks.
    pub fn parse_blocks(&self, source: &str) -> Vec<Block> {
        let mut blocks = Vec::new();
        if source.is_empty() {
            return blocks;
        }
        let mut rest = source;
        loop {
            let matched = self.registry.parse_block.iter().find_map(|(_, rule)| {
                rule(rest, self).filter(|m| m.consumed > 0 && m.consumed <= rest.len())
            });
            let consumed = match matched {
                Some(m) => {
                    blocks.push(m.block);
                    m.consumed
                }
                None => {
                    // Fallback: the line is a paragraph.
                    let line_end = rest.find('\n').unwrap_or(rest.len());
                    trace!(len = line_end, "no block rule matched; paragraph fallback");
                    blocks.push(Block::Paragraph {
                        content: self.parse_inlines(&rest[..line_end]),
                    });
                    line_end
                }
            };
            rest = &rest[consumed..];
            if rest.is_empty() {
                break;
            }
            if let Some(after) = rest.strip_prefix('\n') {
                rest = after;
                if rest.is_empty() {
                    // A trailing newline ends in an empty last line.
                    blocks.push(Block::Paragraph { content: Vec::new() });
                    break;
                }
            }
        }
        blocks
    }

    /// Parse inline content, offering each position to the inline rules in
    /// registration order.
    pub fn parse_inlines(&self, source: &str) -> Vec<Inline> {
        let mut out = Vec::new();
        let mut text = String::new();
        let mut rest = source;
        while !rest.is_empty() {
            let matched = self.registry.parse_inline.iter().find_map(|(_, rule)| {
                rule(rest, self).filter(|m| m.consumed > 0 && m.consumed <= rest.len())
            });
            match matched {
                Some(m) => {
                    if !text.is_empty() {
                        out.push(Inline::Text {
                            text: std::mem::take(&mut text),
                        });
                    }
                    out.push(m.inline);
                    rest = &rest[m.consumed..];
                }
                None => {
                    let grapheme = segment::graphemes(rest)
                        .next()
                        .expect("non-empty input has a first grapheme");
                    text.push_str(grapheme);
                    rest = &rest[grapheme.len()..];
                }
            }
        }
        if !text.is_empty() {
            out.push(Inline::Text { text });
        }
        out
    }
}
