/*!
 * # prosemark-syntax
 *
 * The bundled markdown-flavored extensions for the prosemark engine. Each
 * module contributes one slice of the grammar through the same registration
 * surface third-party extensions use; the engine itself never special-cases
 * any of them.
 *
 * | module       | markup                                    |
 * |--------------|-------------------------------------------|
 * | `emphasis`   | `**strong**`, `*em*`, `` `code` ``        |
 * | `link`       | `[text](url)`                             |
 * | `heading`    | `# ` through `###### `                    |
 * | `blockquote` | `> quoted`                                |
 * | `list`       | `- bullet`, `1. ordered`, nested by indent|
 * | `media`      | `![alt](src)` blocks, `@mention` inlines  |
 *
 * Registration order is grammar priority, so [`extensions`] returns the
 * modules in the order their rules must be tried.
 */

use prosemark_engine::{EditCommand, Extension, RuntimeConfig, Teardown};

pub mod blockquote;
pub mod emphasis;
pub mod heading;
pub mod link;
pub mod list;
pub mod media;

/// Wrapper kind names used by the bundled extensions.
pub mod kind {
    pub const STRONG: &str = "strong";
    pub const EM: &str = "em";
    pub const CODE: &str = "code";
    pub const LINK: &str = "link";
    pub const BLOCKQUOTE: &str = "blockquote";
    pub const BULLET_ITEM: &str = "bullet-list-item";
    pub const ORDERED_ITEM: &str = "ordered-list-item";
    pub const IMAGE: &str = "image";
    pub const MENTION: &str = "mention";

    pub fn heading(level: usize) -> String {
        format!("heading-{level}")
    }
}

/// All bundled extensions, in registration order. Block grammars that
/// anchor on distinctive line prefixes come first; `media` precedes `link`
/// so `![` is never mistaken for a link opener.
pub fn extensions() -> Vec<Extension> {
    vec![
        heading::extension(),
        blockquote::extension(),
        list::extension(),
        media::extension(),
        link::extension(),
        emphasis::extension(),
        base_keys(),
    ]
}

/// A runtime with the full bundled grammar registered.
pub fn runtime(config: RuntimeConfig) -> prosemark_engine::Runtime {
    prosemark_engine::Runtime::with_extensions(config, extensions())
}

/// Editing keys that belong to no particular markup.
fn base_keys() -> Extension {
    Box::new(|host| {
        let registrations = vec![
            host.register_keybinding("Enter", EditCommand::InsertLineBreak),
            host.register_keybinding("Backspace", EditCommand::DeleteBackward),
            host.register_keybinding("Delete", EditCommand::DeleteForward),
        ];
        Some(Teardown::new(registrations))
    })
}
