use serde::{Deserialize, Serialize};

fn default_languages() -> Vec<String> {
    vec!["en".to_string()]
}

fn default_gpu() -> bool {
    true
}

fn default_wait_seconds() -> u64 {
    30
}

/// Which OCR backend to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// Windows.Media.Ocr on Windows, tesseract everywhere else
    #[default]
    Auto,
    Tesseract,
    Winrt,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct OcrConfig {
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
    /// Prefer GPU inference when the engine supports it
    #[serde(default = "default_gpu")]
    pub gpu: bool,
    pub engine: EngineKind,
    /// Block startup until the engine is initialized
    pub wait_for_engine: bool,
    #[serde(default = "default_wait_seconds")]
    pub wait_seconds: u64,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            languages: default_languages(),
            gpu: default_gpu(),
            engine: EngineKind::default(),
            wait_for_engine: false,
            wait_seconds: default_wait_seconds(),
        }
    }
}

/// Split a comma separated language list, dropping blanks
pub fn parse_language_list(csv: &str) -> Vec<String> {
    csv.split(',')
        .map(str::trim)
        .filter(|lang| !lang.is_empty())
        .map(str::to_string)
        .collect()
}
