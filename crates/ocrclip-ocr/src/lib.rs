mod bitmap;
mod capture;
mod engine;
mod hotkey;
mod lazy;
mod select;
mod tesseract;
mod which;
#[cfg(windows)]
mod winrt;

pub use bitmap::{CapturedImage, ImageError};
pub use capture::{CaptureError, CaptureSurface, ChainSurface, CliSurface, CliTool, XcapSurface};
pub use engine::{EngineOptions, OcrEngine, OcrError, normalize_text};
pub use hotkey::{HotkeyError, HotkeyManager, HotkeySource, parse_hotkey};
pub use lazy::LazyEngine;
pub use select::{CommandSelector, FixedRegion, PrimaryMonitor, RegionSelector, parse_geometry};
pub use tesseract::{TesseractEngine, tesseract_languages};
pub use which::find_program;
#[cfg(windows)]
pub use winrt::WinRtEngine;
