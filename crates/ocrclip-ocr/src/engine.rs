use crate::bitmap::{CapturedImage, ImageError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OcrError {
    #[error("OCR engine is still initializing")]
    NotReady,

    #[error("OCR engine failed to initialize: {0}")]
    InitFailed(String),

    #[error("unsupported image: {0}")]
    Image(#[from] ImageError),

    #[error("{program} not found on PATH")]
    MissingProgram { program: String },

    #[error("{0}")]
    Engine(String),

    #[error("OCR engine not available on this platform: {0}")]
    Unsupported(String),
}

/// Text recognition backend.
///
/// Implementations block the calling thread for the whole inference and must
/// return an empty string, not an error, when the image holds no text.
pub trait OcrEngine: Send + Sync {
    fn recognize(&self, image: &CapturedImage) -> Result<String, OcrError>;
}

impl<T: OcrEngine + ?Sized> OcrEngine for std::sync::Arc<T> {
    fn recognize(&self, image: &CapturedImage) -> Result<String, OcrError> {
        (**self).recognize(image)
    }
}

impl<T: OcrEngine + ?Sized> OcrEngine for Box<T> {
    fn recognize(&self, image: &CapturedImage) -> Result<String, OcrError> {
        (**self).recognize(image)
    }
}

/// Construction-time settings shared by every engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    /// Language codes in the short form users type, e.g. `en`, `ja`, `ch_sim`
    pub languages: Vec<String>,
    pub gpu: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            languages: vec!["en".to_string()],
            gpu: true,
        }
    }
}

/// Collapse engine output into newline separated lines without blank lines
/// or trailing whitespace
pub fn normalize_text(raw: &str) -> String {
    raw.lines()
        .map(|line| line.trim_end_matches(|c: char| c.is_whitespace() || c == '\u{c}'))
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("HELLO\n\n\u{c}"), "HELLO");
        assert_eq!(normalize_text("  one  \r\n\ntwo\t\n"), "  one\ntwo");
        assert_eq!(normalize_text("\u{c}\n \n"), "");
        assert_eq!(normalize_text(""), "");
    }
}
