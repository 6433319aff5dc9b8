use ocrclip_types::CaptureRegion;
use serde::{Deserialize, Serialize};

/// How the capture region is chosen when a capture is triggered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SelectorKind {
    /// Drag-select tool if one is installed, otherwise the fixed region or
    /// the primary monitor
    #[default]
    Auto,
    Slurp,
    Slop,
    Fixed,
    Fullscreen,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct CaptureConfig {
    pub selector: SelectorKind,
    pub region: Option<CaptureRegion>,
}
