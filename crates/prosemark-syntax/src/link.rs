//! Links: `[text](url)` inline wrappers carrying the target in node data.
//!
//! The label is regular inline content and can nest emphasis; the `](url)`
//! tail and the opening bracket are source-only, so a link contributes only
//! its label's cursor slots. Placement is `Outside`: typing at either edge
//! lands next to the link, never silently inside it.

use std::sync::LazyLock;

use regex::Regex;

use prosemark_engine::{
    CaretPlacement, CursorSourceBuilder, Extension, Inline, InlineMatch, NodeData, ParseCx,
    SerializeCx, Serialized, Teardown,
};

use crate::kind;

static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://\S+$").expect("static pattern"));

pub fn extension() -> Extension {
    Box::new(|host| {
        let registrations = vec![
            host.register_parse_inline(Box::new(parse)),
            host.register_serialize_inline(Box::new(serialize)),
            host.register_inline_wrapper_affinity(kind::LINK, CaretPlacement::Outside),
            host.register_on_paste_text(Box::new(paste_url)),
        ];
        Some(Teardown::new(registrations))
    })
}

fn parse(source: &str, cx: &ParseCx<'_>) -> Option<InlineMatch> {
    let inner = source.strip_prefix('[')?;
    let label_end = inner.find("](")?;
    if label_end == 0 {
        return None;
    }
    let after_label = &inner[label_end + 2..];
    let url_end = after_label.find(')')?;
    let url = &after_label[..url_end];
    // A nested bracket before the separator means this is not a link.
    let label = &inner[..label_end];
    if label.contains('[') || label.contains('\n') || url.contains('\n') {
        return None;
    }
    let mut data = NodeData::new();
    data.insert("url".into(), url.into());
    Some(InlineMatch {
        inline: Inline::wrapper_with_data(kind::LINK, cx.parse_inlines(label), data),
        consumed: 1 + label_end + 2 + url_end + 1,
    })
}

fn serialize(inline: &Inline, cx: &SerializeCx<'_>) -> Option<Serialized> {
    let Inline::Wrapper {
        kind,
        children,
        data,
    } = inline
    else {
        return None;
    };
    if kind != crate::kind::LINK {
        return None;
    }
    let url = data.get("url").map(String::as_str).unwrap_or("");
    let mut builder = CursorSourceBuilder::new();
    builder.append_source_only("[");
    builder.append_serialized(cx.serialize_inlines(children));
    builder.append_source_only("](");
    builder.append_source_only(url);
    builder.append_source_only(")");
    Some(builder.build())
}

/// Pasting a bare URL produces a link labeled with the URL itself.
fn paste_url(text: &str) -> Option<String> {
    if !URL.is_match(text) {
        return None;
    }
    Some(format!("[{text}]({text})"))
}
