//! Inline emphasis: `**strong**`, `*em*` and `` `code` ``.
//!
//! All three are symmetric-marker wrappers with `Inside` caret placement, so
//! typing at the edge of a run extends the run. Matching is greedy and
//! non-backtracking: a marker without a closer on the same line stays
//! literal text. Strong must be registered before em so `**` is never read
//! as two em markers. An empty marker pair parses into an empty wrapper,
//! which normalization then deletes; `"****"` canonicalizes to `""`.

use prosemark_engine::{
    CaretPlacement, EditCommand, Extension, Inline, InlineMatch, ParseCx, SerializeCx, Serialized,
    Teardown,
};
use prosemark_engine::CursorSourceBuilder;

use crate::kind;

pub fn extension() -> Extension {
    Box::new(|host| {
        let registrations = vec![
            host.register_parse_inline(Box::new(parse_strong)),
            host.register_parse_inline(Box::new(parse_em)),
            host.register_parse_inline(Box::new(parse_code)),
            host.register_serialize_inline(Box::new(serialize)),
            host.register_normalize_inline(Box::new(flatten_nested_duplicates)),
            host.register_toggle_inline(kind::STRONG, "**", "**"),
            host.register_toggle_inline(kind::EM, "*", "*"),
            host.register_toggle_inline(kind::CODE, "`", "`"),
            host.register_inline_wrapper_affinity(kind::STRONG, CaretPlacement::Inside),
            host.register_inline_wrapper_affinity(kind::EM, CaretPlacement::Inside),
            host.register_inline_wrapper_affinity(kind::CODE, CaretPlacement::Inside),
            host.register_keybinding("Mod-b", EditCommand::ToggleInline(kind::STRONG.into())),
            host.register_keybinding("Mod-i", EditCommand::ToggleInline(kind::EM.into())),
            host.register_keybinding("Mod-e", EditCommand::ToggleInline(kind::CODE.into())),
        ];
        Some(Teardown::new(registrations))
    })
}

fn parse_strong(source: &str, cx: &ParseCx<'_>) -> Option<InlineMatch> {
    let inner = source.strip_prefix("**")?;
    let end = inner.find("**")?;
    Some(InlineMatch {
        inline: Inline::wrapper(kind::STRONG, cx.parse_inlines(&inner[..end])),
        consumed: end + 4,
    })
}

fn parse_em(source: &str, cx: &ParseCx<'_>) -> Option<InlineMatch> {
    let inner = source.strip_prefix('*')?;
    let end = inner.find('*')?;
    Some(InlineMatch {
        inline: Inline::wrapper(kind::EM, cx.parse_inlines(&inner[..end])),
        consumed: end + 2,
    })
}

/// Code spans keep their content raw: no nested markup inside backticks.
fn parse_code(source: &str, _cx: &ParseCx<'_>) -> Option<InlineMatch> {
    let inner = source.strip_prefix('`')?;
    let end = inner.find('`')?;
    Some(InlineMatch {
        inline: Inline::wrapper(kind::CODE, vec![Inline::text(&inner[..end])]),
        consumed: end + 2,
    })
}

fn serialize(inline: &Inline, cx: &SerializeCx<'_>) -> Option<Serialized> {
    let Inline::Wrapper { kind, children, .. } = inline else {
        return None;
    };
    let marker = match kind.as_str() {
        k if k == kind::STRONG => "**",
        k if k == kind::EM => "*",
        k if k == kind::CODE => "`",
        _ => return None,
    };
    let mut builder = CursorSourceBuilder::new();
    builder.append_source_only(marker);
    builder.append_serialized(cx.serialize_inlines(children));
    builder.append_source_only(marker);
    Some(builder.build())
}

/// `**` inside `**` serializes as four asterisks in a row, which would not
/// reparse; collapse a wrapper directly containing its own kind instead.
fn flatten_nested_duplicates(inline: Inline) -> Option<Inline> {
    let Inline::Wrapper {
        kind,
        children,
        data,
    } = inline
    else {
        return Some(inline);
    };
    if !matches!(kind.as_str(), "strong" | "em" | "code") {
        return Some(Inline::Wrapper {
            kind,
            children,
            data,
        });
    }
    let mut flattened = Vec::with_capacity(children.len());
    for child in children {
        match child {
            Inline::Wrapper {
                kind: child_kind,
                children: grandchildren,
                ..
            } if child_kind == kind => flattened.extend(grandchildren),
            other => flattened.push(other),
        }
    }
    Some(Inline::Wrapper {
        kind,
        children: flattened,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use prosemark_engine::{Runtime, RuntimeConfig};
    use pretty_assertions::assert_eq;

    fn runtime() -> Runtime {
        Runtime::with_extensions(RuntimeConfig::default(), vec![extension()])
    }

    #[test]
    fn strong_round_trips() {
        let rt = runtime();
        let state = rt.create_state("**ab**", None);
        assert_eq!(state.source, "**ab**");
        assert_eq!(state.map.cursor_len(), 2);
    }

    #[test]
    fn nested_em_inside_strong() {
        let rt = runtime();
        let doc = rt.parse("**a*b*c**");
        let blocks = &doc.blocks;
        assert_eq!(blocks.len(), 1);
        let serialized = rt.serialize(&doc);
        assert_eq!(serialized.source, "**a*b*c**");
        assert_eq!(serialized.map.cursor_len(), 3);
    }

    #[test]
    fn unterminated_marker_stays_literal() {
        let rt = runtime();
        let state = rt.create_state("*ab", None);
        assert_eq!(state.source, "*ab");
        assert_eq!(state.map.cursor_len(), 3);
    }

    #[test]
    fn empty_marker_pair_normalizes_away() {
        let rt = runtime();
        let state = rt.create_state("****", None);
        assert_eq!(state.source, "");
        assert_eq!(state.map.cursor_len(), 0);
        let state = rt.create_state("a**b", None);
        assert_eq!(state.source, "ab");
    }

    #[test]
    fn code_content_is_raw() {
        let rt = runtime();
        let state = rt.create_state("`**x**`", None);
        assert_eq!(state.source, "`**x**`");
        // Five raw characters inside the span, no strong wrapper.
        assert_eq!(state.map.cursor_len(), 5);
    }

    #[test]
    fn nested_duplicate_strong_collapses() {
        let rt = runtime();
        let doc = rt.normalize(rt.parse("**a**"));
        let doubled = Inline::wrapper(
            "strong",
            vec![Inline::wrapper("strong", vec![Inline::text("a")])],
        );
        let normalized = rt.normalize(prosemark_engine::Doc::new(vec![
            prosemark_engine::Block::paragraph(vec![doubled]),
        ]));
        assert_eq!(normalized, doc);
    }
}
