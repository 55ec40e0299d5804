use std::str::Utf8Error;

/// Errors surfaced by the engine's fallible construction paths.
///
/// Everything driven by user input is total (selections clamp, malformed
/// markup falls back to literal text), so this only covers loading a document
/// from raw bytes.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("document is not valid UTF-8: {0}")]
    NonUtf8Document(#[from] Utf8Error),
}
