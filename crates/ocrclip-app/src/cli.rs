use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use ocrclip_config::Config;
use ocrclip_config::capture::SelectorKind;
use ocrclip_config::hotkey::HotkeyBackend;
use ocrclip_config::ocr::{EngineKind, parse_language_list};
use ocrclip_types::CaptureRegion;

#[derive(Parser, Debug)]
#[command(name = "ocrclip")]
#[command(about = "Capture a screen region, OCR it and copy the text to the clipboard")]
#[command(version)]
pub struct Args {
    /// Force CPU-only inference
    #[arg(long)]
    pub no_gpu: bool,

    /// Comma separated language codes, e.g. `en,ja`
    #[arg(long, value_name = "CSV")]
    pub lang: Option<String>,

    /// Capture hotkey, e.g. `ctrl+shift+s`
    #[arg(long, value_name = "SPEC")]
    pub hotkey: Option<String>,

    /// Don't register a global hotkey; the tray trigger still works
    #[arg(long)]
    pub no_hotkey: bool,

    #[arg(long, value_enum, value_name = "NAME")]
    pub hotkey_backend: Option<HotkeyBackend>,

    /// Block startup until the OCR engine is initialized
    #[arg(long)]
    pub wait_ocr: bool,

    /// How long `--wait-ocr` waits
    #[arg(long, value_name = "N")]
    pub wait_seconds: Option<u64>,

    #[arg(long, value_enum, value_name = "NAME")]
    pub engine: Option<EngineKind>,

    /// How the capture region is picked
    #[arg(long, value_enum, value_name = "NAME")]
    pub selector: Option<SelectorKind>,

    /// Fixed capture region as `x,y,w,h`
    #[arg(long, value_name = "X,Y,W,H")]
    pub region: Option<CaptureRegion>,

    /// JSON configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Capture once right away and exit after the result
    #[arg(long)]
    pub once: bool,
}

impl Args {
    /// Configuration file (or environment defaults) with flags applied on top,
    /// plus any warnings to log once logging is up
    pub fn load_config(&self) -> anyhow::Result<(Config, Vec<String>)> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => Config::new(),
        };

        let warnings = self.apply(&mut config);
        Ok((config, warnings))
    }

    pub fn apply(&self, config: &mut Config) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.no_gpu {
            config.ocr.gpu = false;
        }

        if let Some(lang) = &self.lang {
            let languages = parse_language_list(lang);
            if languages.is_empty() {
                warnings.push(format!("Empty --lang, keeping {:?}", config.ocr.languages));
            } else {
                config.ocr.languages = languages;
            }
        }

        if let Some(hotkey) = &self.hotkey {
            config.hotkey.spec = hotkey.clone();
        }
        if self.no_hotkey {
            config.hotkey.enabled = false;
        }
        if let Some(backend) = self.hotkey_backend {
            config.hotkey.backend = backend;
        }

        // a single capture is pointless before the engine is up
        if self.wait_ocr || self.once {
            config.ocr.wait_for_engine = true;
        }
        if let Some(seconds) = self.wait_seconds {
            config.ocr.wait_seconds = seconds;
        }
        if let Some(engine) = self.engine {
            config.ocr.engine = engine;
        }

        if let Some(region) = self.region {
            config.capture.region = Some(region);
            if self.selector.is_none() {
                config.capture.selector = SelectorKind::Fixed;
            }
        }
        if let Some(selector) = self.selector {
            config.capture.selector = selector;
        }

        warnings
    }
}
